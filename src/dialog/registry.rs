//! Dialog registry
//!
//! The registry is responsible for:
//! - Holding the fixed, ordered catalog of dialogs
//! - Toggling open flags (open one, close one, close all)
//! - Publishing a snapshot to subscribers whenever a flag changes
//!
//! Registration order is never changed by open/close; it is the base ordering
//! consumed by the stack layout engine.

use super::types::{Dialog, DialogEntry, DialogError, DialogId, DialogResult, RegistrySnapshot};
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Ordered catalog of dialogs plus their open/closed flags
pub struct DialogRegistry<C> {
    /// Dialogs in registration order
    dialogs: Vec<Dialog<C>>,

    /// Bumped on every state-changing mutation
    revision: u64,

    /// Change notifications for subscribers
    notifier: watch::Sender<RegistrySnapshot>,
}

impl<C> DialogRegistry<C> {
    /// Create a registry from a fixed catalog. Duplicate ids are rejected.
    pub fn new(dialogs: Vec<Dialog<C>>) -> DialogResult<Self> {
        let mut seen = HashSet::with_capacity(dialogs.len());
        for dialog in &dialogs {
            if !seen.insert(dialog.id().clone()) {
                return Err(DialogError::DuplicateId(dialog.id().clone()));
            }
        }

        let snapshot = Self::build_snapshot(&dialogs, 0);
        let (notifier, _) = watch::channel(snapshot);

        debug!("Dialog registry created with {} dialogs", dialogs.len());

        Ok(Self {
            dialogs,
            revision: 0,
            notifier,
        })
    }

    /// Open the dialog matching `id`. Unknown ids are ignored.
    pub fn open_dialog(&mut self, id: &DialogId) {
        self.set_open(id, true);
    }

    /// Close the dialog matching `id`. Unknown ids are ignored.
    pub fn close_dialog(&mut self, id: &DialogId) {
        self.set_open(id, false);
    }

    /// Close every dialog
    pub fn clear_dialogs(&mut self) {
        let mut changed = false;
        for dialog in &mut self.dialogs {
            changed |= dialog.set_open(false);
        }

        if changed {
            debug!("Cleared all dialogs");
            self.publish();
        }
    }

    /// All dialogs, open and closed, in registration order
    pub fn dialogs(&self) -> &[Dialog<C>] {
        &self.dialogs
    }

    /// Ids of the open dialogs, in registration order
    pub fn open_ids(&self) -> Vec<DialogId> {
        self.dialogs
            .iter()
            .filter(|dialog| dialog.is_open())
            .map(|dialog| dialog.id().clone())
            .collect()
    }

    /// Get a dialog by id
    pub fn get(&self, id: &DialogId) -> Option<&Dialog<C>> {
        self.dialogs.iter().find(|dialog| dialog.id() == id)
    }

    /// Check whether a dialog is open (`false` for unknown ids)
    pub fn is_open(&self, id: &DialogId) -> bool {
        self.get(id).map(Dialog::is_open).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Number of state-changing mutations so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Current state as published to subscribers
    pub fn snapshot(&self) -> RegistrySnapshot {
        Self::build_snapshot(&self.dialogs, self.revision)
    }

    /// Subscribe to change notifications. The receiver starts at the current state.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.notifier.subscribe()
    }

    fn set_open(&mut self, id: &DialogId, open: bool) {
        let Some(dialog) = self.dialogs.iter_mut().find(|dialog| dialog.id() == id) else {
            trace!("Ignoring {} for unknown dialog '{}'", if open { "open" } else { "close" }, id);
            return;
        };

        if dialog.set_open(open) {
            debug!("Dialog '{}' {}", id, if open { "opened" } else { "closed" });
            self.publish();
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        let snapshot = Self::build_snapshot(&self.dialogs, self.revision);
        self.notifier.send_replace(snapshot);
    }

    fn build_snapshot(dialogs: &[Dialog<C>], revision: u64) -> RegistrySnapshot {
        RegistrySnapshot {
            revision,
            entries: dialogs
                .iter()
                .map(|dialog| DialogEntry {
                    id: dialog.id().clone(),
                    open: dialog.is_open(),
                })
                .collect(),
        }
    }
}

impl<C> std::fmt::Debug for DialogRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRegistry")
            .field("dialogs", &self.snapshot().entries)
            .field("revision", &self.revision)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(ids: &[&str]) -> DialogRegistry<()> {
        DialogRegistry::new(ids.iter().map(|id| Dialog::new(*id, ())).collect())
            .expect("unique ids")
    }

    fn ids(registry: &DialogRegistry<()>) -> Vec<String> {
        registry.dialogs().iter().map(|d| d.id().to_string()).collect()
    }

    #[test]
    fn test_open_and_close_keep_catalog() {
        let mut registry = registry(&["a", "b", "c"]);
        let before = ids(&registry);

        let ops: [(&str, bool); 6] = [
            ("b", true),
            ("a", true),
            ("b", false),
            ("c", true),
            ("a", false),
            ("z", true),
        ];
        for (id, open) in ops {
            let id = DialogId::from(id);
            if open {
                registry.open_dialog(&id);
            } else {
                registry.close_dialog(&id);
            }
            assert_eq!(ids(&registry), before);
            assert_eq!(registry.len(), 3);
        }

        assert_eq!(registry.open_ids(), vec![DialogId::from("c")]);
    }

    #[test]
    fn test_multiple_dialogs_open_at_once() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.open_dialog(&"c".into());
        registry.open_dialog(&"a".into());

        // registration order, not activation order
        assert_eq!(registry.open_ids(), vec![DialogId::from("a"), DialogId::from("c")]);
    }

    #[test]
    fn test_clear_always_empties_open_set() {
        let mut registry = registry(&["a", "b", "c"]);
        registry.clear_dialogs();
        assert!(registry.open_ids().is_empty());

        registry.open_dialog(&"a".into());
        registry.open_dialog(&"b".into());
        registry.open_dialog(&"c".into());
        registry.clear_dialogs();
        assert!(registry.open_ids().is_empty());
        assert_eq!(registry.len(), 3);

        let mut empty = DialogRegistry::<()>::new(Vec::new()).expect("empty registry");
        empty.clear_dialogs();
        assert!(empty.is_empty());
        assert_eq!(empty.revision(), 0);
    }

    #[test]
    fn test_unknown_id_is_noop() {
        let mut registry = registry(&["a", "b", "c"]);
        let before = registry.snapshot();

        registry.open_dialog(&"z".into());
        registry.close_dialog(&"z".into());

        assert_eq!(registry.snapshot(), before);
        assert!(!registry.is_open(&"z".into()));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = DialogRegistry::new(vec![Dialog::new("a", ()), Dialog::new("a", ())]);
        assert_eq!(result.err(), Some(DialogError::DuplicateId("a".into())));
    }

    #[test]
    fn test_initially_open_dialogs() {
        let registry = DialogRegistry::new(vec![Dialog::new("a", ()), Dialog::new("b", ()).opened()])
            .expect("unique ids");
        assert_eq!(registry.open_ids(), vec![DialogId::from("b")]);
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let mut registry = registry(&["a", "b"]);
        let mut receiver = registry.subscribe();
        assert!(!receiver.has_changed().expect("sender alive"));

        registry.open_dialog(&"a".into());
        assert!(receiver.has_changed().expect("sender alive"));
        let snapshot = receiver.borrow_and_update().clone();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.open_ids(), vec![DialogId::from("a")]);

        // already open, unknown id, and closing a closed dialog change nothing
        registry.open_dialog(&"a".into());
        registry.open_dialog(&"z".into());
        registry.close_dialog(&"b".into());
        assert!(!receiver.has_changed().expect("sender alive"));
        assert_eq!(registry.revision(), 1);

        registry.clear_dialogs();
        assert!(receiver.has_changed().expect("sender alive"));
        assert!(receiver.borrow_and_update().open_ids().is_empty());

        registry.clear_dialogs();
        assert!(!receiver.has_changed().expect("sender alive"));
    }

    #[test]
    fn test_content_is_untouched() {
        let mut registry =
            DialogRegistry::new(vec![Dialog::new("a", String::from("payload"))]).expect("unique ids");
        registry.open_dialog(&"a".into());
        registry.clear_dialogs();
        let dialog = registry.get(&"a".into()).expect("registered");
        assert_eq!(dialog.content(), "payload");
    }
}
