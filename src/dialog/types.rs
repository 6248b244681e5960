//! Core dialog types
//!
//! This module defines the identity-bearing dialog record, the snapshot that the
//! registry publishes to its subscribers, and the error type shared by the
//! dialog system.

use serde::{Deserialize, Serialize};

/// Unique identifier for a dialog, supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogId(pub String);

impl DialogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&DialogId> for DialogId {
    fn from(id: &DialogId) -> Self {
        id.clone()
    }
}

impl std::fmt::Display for DialogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named, toggle-able overlay panel with caller-owned content.
///
/// The `open` flag can only be changed through the registry; the content is
/// never inspected by it.
#[derive(Debug, Clone)]
pub struct Dialog<C> {
    id: DialogId,
    open: bool,
    content: C,
}

impl<C> Dialog<C> {
    /// Create a closed dialog
    pub fn new(id: impl Into<DialogId>, content: C) -> Self {
        Self {
            id: id.into(),
            open: false,
            content,
        }
    }

    /// Register the dialog already open
    pub fn opened(mut self) -> Self {
        self.open = true;
        self
    }

    pub fn id(&self) -> &DialogId {
        &self.id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub(crate) fn set_open(&mut self, open: bool) -> bool {
        let changed = self.open != open;
        self.open = open;
        changed
    }
}

/// Id and open flag of one registered dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEntry {
    pub id: DialogId,
    pub open: bool,
}

/// State published to registry subscribers after every change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Incremented once per state-changing mutation
    pub revision: u64,
    /// Every dialog in registration order
    pub entries: Vec<DialogEntry>,
}

impl RegistrySnapshot {
    /// Ids of the open dialogs, in registration order
    pub fn open_ids(&self) -> Vec<DialogId> {
        self.entries
            .iter()
            .filter(|entry| entry.open)
            .map(|entry| entry.id.clone())
            .collect()
    }
}

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogError {
    #[error("dialog operations must be used within a DialogProvider")]
    MissingProvider,

    #[error("Dialog with ID '{0}' is registered more than once")]
    DuplicateId(DialogId),

    #[error("Invalid dialog configuration: {0}")]
    InvalidConfig(String),
}
