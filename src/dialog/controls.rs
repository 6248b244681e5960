//! Trigger and button controllers
//!
//! Stateless controllers that change dialog state on activation. The caller's
//! click handler, if any, runs first; the registry operation runs after it.
//! Both go through the [`DialogContext`], never through the dialog records.

use super::context::DialogContext;
use super::types::{DialogError, DialogId, DialogResult};
use serde::{Deserialize, Serialize};

/// Caller-supplied click handler
pub type ClickHandler = Box<dyn FnMut() + Send + Sync>;

/// Opens a dialog when activated
pub struct DialogTrigger<C> {
    context: DialogContext<C>,
    dialog_id: Option<DialogId>,
    on_click: Option<ClickHandler>,
    label: String,
}

impl<C> DialogTrigger<C> {
    pub fn new(context: DialogContext<C>) -> Self {
        Self {
            context,
            dialog_id: None,
            on_click: None,
            label: String::new(),
        }
    }

    pub fn dialog_id(mut self, id: impl Into<DialogId>) -> Self {
        self.dialog_id = Some(id.into());
        self
    }

    pub fn on_click(mut self, handler: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.label
    }

    pub fn target(&self) -> Option<&DialogId> {
        self.dialog_id.as_ref()
    }

    /// Run the click handler, then open the target dialog
    pub fn click(&mut self) -> DialogResult<()> {
        ensure_bound(&self.context)?;

        if let Some(handler) = self.on_click.as_mut() {
            handler();
        }

        if let Some(id) = &self.dialog_id {
            self.context.open_dialog(id)?;
        }

        Ok(())
    }
}

/// What a [`DialogButton`] does with its target dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    /// Only runs the click handler
    #[default]
    Default,
    Open,
    Close,
}

/// Opens or closes a dialog when activated, depending on its kind
pub struct DialogButton<C> {
    context: DialogContext<C>,
    kind: ButtonKind,
    dialog_id: Option<DialogId>,
    on_click: Option<ClickHandler>,
    label: String,
}

impl<C> DialogButton<C> {
    pub fn new(context: DialogContext<C>) -> Self {
        Self {
            context,
            kind: ButtonKind::Default,
            dialog_id: None,
            on_click: None,
            label: String::new(),
        }
    }

    pub fn kind(mut self, kind: ButtonKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn dialog_id(mut self, id: impl Into<DialogId>) -> Self {
        self.dialog_id = Some(id.into());
        self
    }

    pub fn on_click(mut self, handler: impl FnMut() + Send + Sync + 'static) -> Self {
        self.on_click = Some(Box::new(handler));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn text(&self) -> &str {
        &self.label
    }

    /// Run the click handler, then open or close the target dialog
    pub fn click(&mut self) -> DialogResult<()> {
        ensure_bound(&self.context)?;

        if let Some(handler) = self.on_click.as_mut() {
            handler();
        }

        match (self.kind, &self.dialog_id) {
            (ButtonKind::Open, Some(id)) => self.context.open_dialog(id),
            (ButtonKind::Close, Some(id)) => self.context.close_dialog(id),
            _ => Ok(()),
        }
    }
}

fn ensure_bound<C>(context: &DialogContext<C>) -> DialogResult<()> {
    if context.is_bound() {
        Ok(())
    } else {
        Err(DialogError::MissingProvider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::context::DialogProvider;
    use crate::dialog::types::Dialog;
    use std::sync::{Arc, Mutex};

    fn provider() -> DialogProvider<()> {
        DialogProvider::new(vec![Dialog::new("a", ()), Dialog::new("b", ())]).unwrap()
    }

    #[test]
    fn test_trigger_opens_dialog() {
        let provider = provider();
        let mut trigger = DialogTrigger::new(provider.context()).dialog_id("a");

        trigger.click().unwrap();
        assert!(provider.context().is_open("a").unwrap());
        assert!(!provider.context().is_open("b").unwrap());
    }

    #[test]
    fn test_trigger_runs_handler_before_opening() {
        let provider = provider();
        let context = provider.context();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let observer = context.clone();
        let log = Arc::clone(&seen);
        let mut trigger = DialogTrigger::new(context.clone())
            .dialog_id("b")
            .on_click(move || {
                let open = observer.is_open("b").unwrap();
                log.lock().unwrap().push(open);
            });

        trigger.click().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![false]);
        assert!(context.is_open("b").unwrap());
    }

    #[test]
    fn test_trigger_without_target_only_runs_handler() {
        let provider = provider();
        let clicks = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&clicks);
        let mut trigger = DialogTrigger::new(provider.context()).on_click(move || {
            *counter.lock().unwrap() += 1;
        });

        trigger.click().unwrap();
        trigger.click().unwrap();
        assert_eq!(*clicks.lock().unwrap(), 2);
        assert!(provider.context().open_ids().unwrap().is_empty());
    }

    #[test]
    fn test_button_kinds() {
        let provider = provider();
        let context = provider.context();

        DialogButton::new(context.clone())
            .kind(ButtonKind::Open)
            .dialog_id("a")
            .click()
            .unwrap();
        assert!(context.is_open("a").unwrap());

        DialogButton::new(context.clone())
            .kind(ButtonKind::Default)
            .dialog_id("b")
            .click()
            .unwrap();
        assert!(!context.is_open("b").unwrap());

        DialogButton::new(context.clone())
            .kind(ButtonKind::Close)
            .dialog_id("a")
            .click()
            .unwrap();
        assert!(!context.is_open("a").unwrap());
    }

    #[test]
    fn test_button_unknown_target_is_noop() {
        let provider = provider();
        let mut button = DialogButton::new(provider.context())
            .kind(ButtonKind::Open)
            .dialog_id("missing");
        assert!(button.click().is_ok());
        assert!(provider.context().open_ids().unwrap().is_empty());
    }

    #[test]
    fn test_controls_outside_provider_fail_fast() {
        let ran = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&ran);
        let mut trigger = DialogTrigger::<()>::new(DialogContext::detached())
            .dialog_id("a")
            .on_click(move || *flag.lock().unwrap() = true);

        assert_eq!(trigger.click(), Err(DialogError::MissingProvider));
        assert!(!*ran.lock().unwrap());

        let mut button = DialogButton::<()>::new(DialogContext::detached());
        assert_eq!(button.click(), Err(DialogError::MissingProvider));
    }

    #[test]
    fn test_button_kind_serde() {
        assert_eq!(serde_json::to_string(&ButtonKind::Close).unwrap(), "\"close\"");
        let kind: ButtonKind = serde_json::from_str("\"open\"").unwrap();
        assert_eq!(kind, ButtonKind::Open);
    }
}
