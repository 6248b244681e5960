//! Registry scope and the handle passed to components
//!
//! A [`DialogProvider`] owns a registry for the lifetime of the scope that
//! composes the dialogs. Components never reach for a global; they receive a
//! [`DialogContext`] explicitly. A context whose provider is gone (or that was
//! never bound to one) fails every operation with
//! [`DialogError::MissingProvider`].

use super::registry::DialogRegistry;
use super::types::{Dialog, DialogEntry, DialogError, DialogId, DialogResult, RegistrySnapshot};
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tokio::sync::watch;

type SharedRegistry<C> = Arc<RwLock<DialogRegistry<C>>>;

/// Owner of a dialog registry. Dropping the provider destroys the registry.
pub struct DialogProvider<C> {
    registry: SharedRegistry<C>,
}

impl<C> DialogProvider<C> {
    /// Create a provider for a fixed catalog of dialogs
    pub fn new(dialogs: Vec<Dialog<C>>) -> DialogResult<Self> {
        Ok(Self {
            registry: Arc::new(RwLock::new(DialogRegistry::new(dialogs)?)),
        })
    }

    /// Handle for descendants of this scope
    pub fn context(&self) -> DialogContext<C> {
        DialogContext {
            registry: Arc::downgrade(&self.registry),
        }
    }
}

impl<C> std::fmt::Debug for DialogProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogProvider").finish_non_exhaustive()
    }
}

/// Handle through which components read and mutate a provider's registry
pub struct DialogContext<C> {
    registry: Weak<RwLock<DialogRegistry<C>>>,
}

impl<C> DialogContext<C> {
    /// A context that is not bound to any provider
    pub fn detached() -> Self {
        Self {
            registry: Weak::new(),
        }
    }

    /// Whether the owning provider is still alive
    pub fn is_bound(&self) -> bool {
        self.registry.strong_count() > 0
    }

    pub fn open_dialog(&self, id: impl Into<DialogId>) -> DialogResult<()> {
        let id = id.into();
        self.write(|registry| registry.open_dialog(&id))
    }

    pub fn close_dialog(&self, id: impl Into<DialogId>) -> DialogResult<()> {
        let id = id.into();
        self.write(|registry| registry.close_dialog(&id))
    }

    pub fn clear_dialogs(&self) -> DialogResult<()> {
        self.write(DialogRegistry::clear_dialogs)
    }

    /// Ids and open flags of every dialog, in registration order
    pub fn dialogs(&self) -> DialogResult<Vec<DialogEntry>> {
        self.read(|registry| registry.snapshot().entries)
    }

    /// Ids of the open dialogs, in registration order
    pub fn open_ids(&self) -> DialogResult<Vec<DialogId>> {
        self.read(DialogRegistry::open_ids)
    }

    pub fn is_open(&self, id: impl Into<DialogId>) -> DialogResult<bool> {
        let id = id.into();
        self.read(|registry| registry.is_open(&id))
    }

    pub fn snapshot(&self) -> DialogResult<RegistrySnapshot> {
        self.read(DialogRegistry::snapshot)
    }

    /// Borrow the full dialog list, including content, for the duration of `f`
    pub fn with_dialogs<R>(&self, f: impl FnOnce(&[Dialog<C>]) -> R) -> DialogResult<R> {
        self.read(|registry| f(registry.dialogs()))
    }

    pub fn subscribe(&self) -> DialogResult<watch::Receiver<RegistrySnapshot>> {
        self.read(DialogRegistry::subscribe)
    }

    fn upgrade(&self) -> DialogResult<SharedRegistry<C>> {
        self.registry.upgrade().ok_or(DialogError::MissingProvider)
    }

    fn read<R>(&self, f: impl FnOnce(&DialogRegistry<C>) -> R) -> DialogResult<R> {
        let registry = self.upgrade()?;
        let guard = registry.read().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&guard))
    }

    fn write<R>(&self, f: impl FnOnce(&mut DialogRegistry<C>) -> R) -> DialogResult<R> {
        let registry = self.upgrade()?;
        let mut guard = registry.write().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&mut guard))
    }
}

impl<C> Clone for DialogContext<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<C> Default for DialogContext<C> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<C> std::fmt::Debug for DialogContext<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogContext")
            .field("bound", &self.is_bound())
            .finish()
    }
}
