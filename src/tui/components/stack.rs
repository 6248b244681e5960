//! Dialog stack view
//!
//! Renders every open dialog of a registry as a stacked card and routes
//! pointer and key input to the front-most one.
//!
//! # Invariants
//!
//! - Only the front-most open dialog reacts to input; cards behind it are
//!   visible but inert.
//! - A pointer-down outside the front-most card closes every open dialog.
//! - Nothing receives focus when a dialog opens. The action selection starts
//!   empty and only moves on Tab.
//! - Cards whose opacity is at or below [`MIN_VISIBLE_OPACITY`] are not
//!   drawn and cannot be hit.

use super::panel::{Paint, StackContent};
use super::{Component, ComponentState};
use crate::animation::{AnimatedDialog, StackAnimator};
use crate::dialog::{
    DialogButton, DialogContext, DialogId, DialogResult, RegistrySnapshot, StackConfig,
    StackLayout, StackTransform,
};
use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::{buffer::Buffer, layout::Rect};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info};

/// Cards at or below this opacity are skipped
pub const MIN_VISIBLE_OPACITY: f32 = 0.05;

/// Terminal-specific presentation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackViewConfig {
    /// Offset units that make up one terminal row
    pub units_per_row: f32,
    /// Close the front-most dialog on Esc
    pub close_on_escape: bool,
}

impl Default for StackViewConfig {
    fn default() -> Self {
        Self {
            units_per_row: 8.0,
            close_on_escape: true,
        }
    }
}

/// What a pointer-down did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerOutcome {
    /// No dialog was open
    Ignored,
    /// The pointer landed inside the front-most dialog
    Inside,
    /// The pointer landed on an action of the front-most dialog
    Action(usize),
    /// The pointer landed outside and every dialog was closed
    Dismissed,
}

/// Card as drawn in the last frame
#[derive(Debug, Clone)]
struct Card {
    id: DialogId,
    area: Rect,
    exiting: bool,
}

/// Stacked presentation of a dialog registry
pub struct DialogStackView<C> {
    state: ComponentState,
    context: DialogContext<C>,
    config: StackConfig,
    view: StackViewConfig,
    updates: watch::Receiver<RegistrySnapshot>,
    layout: StackLayout,
    animator: StackAnimator,
    cards: Vec<Card>,
    selected_action: Option<usize>,
}

impl<C: StackContent + 'static> DialogStackView<C> {
    /// Create a view bound to `context`.
    ///
    /// Fails with `MissingProvider` when the context is not bound to a live
    /// provider.
    pub fn new(
        context: DialogContext<C>,
        config: StackConfig,
        view: StackViewConfig,
    ) -> DialogResult<Self> {
        let mut updates = context.subscribe()?;
        let snapshot = updates.borrow_and_update().clone();
        let layout = StackLayout::compute(&snapshot.open_ids(), &config);

        let mut animator = StackAnimator::new();
        animator.sync(&layout, Instant::now());

        Ok(Self {
            state: ComponentState::new(),
            context,
            config,
            view,
            updates,
            layout,
            animator,
            cards: Vec::new(),
            selected_action: None,
        })
    }

    pub fn context(&self) -> &DialogContext<C> {
        &self.context
    }

    pub fn layout(&self) -> &StackLayout {
        &self.layout
    }

    pub fn selected_action(&self) -> Option<usize> {
        self.selected_action
    }

    /// Front-most open dialog
    pub fn front(&self) -> Option<&DialogId> {
        self.layout.front().map(|entry| &entry.id)
    }

    /// Pick up registry changes, returning whether the stack moved
    pub fn refresh(&mut self, now: Instant) -> bool {
        if !self.updates.has_changed().unwrap_or(false) {
            self.animator.prune(now);
            return false;
        }

        let snapshot = self.updates.borrow_and_update().clone();
        let layout = StackLayout::compute(&snapshot.open_ids(), &self.config);
        debug!(
            "Dialog stack revision {} has {} open",
            snapshot.revision,
            layout.len()
        );

        if layout.front().map(|e| &e.id) != self.layout.front().map(|e| &e.id) {
            self.selected_action = None;
        }
        self.animator.sync(&layout, now);
        self.layout = layout;
        true
    }

    /// Skip the remaining animation
    pub fn finish_animations(&mut self) {
        self.animator.finish();
    }

    /// Draw every visible card back-to-front into `buf`
    pub fn render_at(&mut self, buf: &mut Buffer, area: Rect, theme: &Theme, now: Instant) {
        self.refresh(now);
        self.state.size = area;

        let frames = self.animator.sample(now);
        let front = self.front().cloned();
        let selected = self.selected_action;
        let units_per_row = self.view.units_per_row;

        let cards = self
            .context
            .with_dialogs(|dialogs| {
                let mut cards = Vec::with_capacity(frames.len());
                for frame in &frames {
                    if frame.transform.opacity <= MIN_VISIBLE_OPACITY {
                        continue;
                    }
                    let Some(dialog) = dialogs.iter().find(|d| d.id() == &frame.id) else {
                        continue;
                    };
                    let content = dialog.content();
                    let card_area = card_area(
                        area,
                        content.preferred_size(),
                        &frame.transform,
                        units_per_row,
                    );
                    let is_front = !frame.exiting && front.as_ref() == Some(&frame.id);
                    let paint = Paint {
                        theme,
                        opacity: frame.transform.opacity,
                        front: is_front,
                        selected_action: if is_front { selected } else { None },
                    };
                    content.render(buf, card_area, &paint);
                    cards.push(card_from(frame, card_area));
                }
                cards
            })
            .unwrap_or_default();

        self.cards = cards;
    }

    /// Route a pointer-down at (`column`, `row`)
    pub fn handle_pointer_down(&mut self, column: u16, row: u16) -> DialogResult<PointerOutcome> {
        let Some(front) = self.front().cloned() else {
            return Ok(PointerOutcome::Ignored);
        };

        let hit = self
            .cards
            .iter()
            .rev()
            .find(|card| card.id == front && !card.exiting)
            .map(|card| card.area);
        let Some(area) = hit else {
            // front dialog not drawn yet; treat the press as outside
            return self.dismiss_all(column, row);
        };

        if !contains(area, column, row) {
            return self.dismiss_all(column, row);
        }

        let action = self.context.with_dialogs(|dialogs| {
            dialogs
                .iter()
                .find(|d| d.id() == &front)
                .and_then(|d| {
                    d.content()
                        .action_areas(area)
                        .iter()
                        .position(|a| contains(*a, column, row))
                })
        })?;

        match action {
            Some(index) => {
                self.selected_action = Some(index);
                self.activate(index)?;
                Ok(PointerOutcome::Action(index))
            }
            None => Ok(PointerOutcome::Inside),
        }
    }

    /// Route a key press, returning whether it was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> DialogResult<bool> {
        if key.kind == KeyEventKind::Release {
            return Ok(false);
        }
        let Some(front) = self.front().cloned() else {
            return Ok(false);
        };

        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) if self.view.close_on_escape => {
                info!("Closing dialog '{}' on escape", front);
                self.context.close_dialog(&front)?;
                Ok(true)
            }
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.cycle_action(&front, true)?;
                Ok(true)
            }
            (KeyCode::BackTab, _) | (KeyCode::Tab, KeyModifiers::SHIFT) => {
                self.cycle_action(&front, false)?;
                Ok(true)
            }
            (KeyCode::Enter, _) => match self.selected_action {
                Some(index) => {
                    self.activate(index)?;
                    Ok(true)
                }
                None => Ok(false),
            },
            _ => Ok(false),
        }
    }

    fn dismiss_all(&mut self, column: u16, row: u16) -> DialogResult<PointerOutcome> {
        info!("Pointer down outside front dialog at ({}, {}), closing all", column, row);
        self.context.clear_dialogs()?;
        Ok(PointerOutcome::Dismissed)
    }

    fn cycle_action(&mut self, front: &DialogId, forward: bool) -> DialogResult<()> {
        let count = self.context.with_dialogs(|dialogs| {
            dialogs
                .iter()
                .find(|d| d.id() == front)
                .map(|d| d.content().actions().len())
                .unwrap_or(0)
        })?;
        if count == 0 {
            self.selected_action = None;
            return Ok(());
        }

        self.selected_action = Some(match (self.selected_action, forward) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(current), true) => (current + 1) % count,
            (Some(current), false) => (current + count - 1) % count,
        });
        Ok(())
    }

    fn activate(&mut self, index: usize) -> DialogResult<()> {
        let Some(front) = self.front().cloned() else {
            return Ok(());
        };
        let action = self.context.with_dialogs(|dialogs| {
            dialogs
                .iter()
                .find(|d| d.id() == &front)
                .and_then(|d| d.content().actions().get(index).cloned())
        })?;
        let Some(action) = action else {
            return Ok(());
        };

        debug!("Activating '{}' on dialog '{}'", action.label, front);
        let mut button = DialogButton::new(self.context.clone())
            .kind(action.kind)
            .label(action.label);
        if let Some(target) = action.target {
            button = button.dialog_id(target);
        }
        button.click()
    }
}

#[async_trait]
impl<C: StackContent + 'static> Component for DialogStackView<C> {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        Ok(self.handle_key(event)?)
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        match event.kind {
            MouseEventKind::Down(_) => {
                let outcome = self.handle_pointer_down(event.column, event.row)?;
                Ok(outcome != PointerOutcome::Ignored)
            }
            _ => Ok(false),
        }
    }

    async fn tick(&mut self) -> Result<()> {
        self.refresh(Instant::now());
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.render_at(frame.buffer_mut(), area, theme, Instant::now());
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }
}

fn card_from(frame: &AnimatedDialog, area: Rect) -> Card {
    Card {
        id: frame.id.clone(),
        area,
        exiting: frame.exiting,
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.left() && column < area.right() && row >= area.top() && row < area.bottom()
}

/// Screen rect of a card centred in `container`.
///
/// The card shrinks around its centre by `scale` and moves vertically by
/// `translate_y / units_per_row` rows. The result always lies inside the
/// container.
pub fn card_area(
    container: Rect,
    size: (u16, u16),
    transform: &StackTransform,
    units_per_row: f32,
) -> Rect {
    let scale = transform.scale.max(0.0);
    let width = ((size.0 as f32 * scale).round() as u16)
        .clamp(1, container.width.max(1))
        .min(container.width);
    let height = ((size.1 as f32 * scale).round() as u16)
        .clamp(1, container.height.max(1))
        .min(container.height);

    let rows = if units_per_row > 0.0 {
        (transform.translate_y / units_per_row).round() as i32
    } else {
        0
    };

    let centre_x = container.x as i32 + container.width as i32 / 2;
    let centre_y = container.y as i32 + container.height as i32 / 2;
    let x = centre_x - width as i32 / 2;
    let y = centre_y - height as i32 / 2 + rows;

    let max_x = container.right() as i32 - width as i32;
    let max_y = container.bottom() as i32 - height as i32;
    let x = x.clamp(container.x as i32, max_x.max(container.x as i32));
    let y = y.clamp(container.y as i32, max_y.max(container.y as i32));

    Rect::new(x as u16, y as u16, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{Dialog, DialogProvider};
    use crate::tui::components::panel::{DialogPanel, PanelAction};
    use crossterm::event::KeyEventState;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 24,
    };

    fn provider() -> DialogProvider<DialogPanel> {
        DialogProvider::new(vec![
            Dialog::new(
                "one",
                DialogPanel::new("One")
                    .with_size(40, 10)
                    .action(PanelAction::open("Next", "two"))
                    .action(PanelAction::close("Close", "one")),
            ),
            Dialog::new("two", DialogPanel::new("Two").with_size(40, 10)),
            Dialog::new("three", DialogPanel::new("Three").with_size(40, 10)),
        ])
        .unwrap()
    }

    fn view(provider: &DialogProvider<DialogPanel>) -> DialogStackView<DialogPanel> {
        DialogStackView::new(
            provider.context(),
            StackConfig::default(),
            StackViewConfig::default(),
        )
        .unwrap()
    }

    fn settle(view: &mut DialogStackView<DialogPanel>) -> Buffer {
        let now = Instant::now();
        view.refresh(now);
        view.finish_animations();
        let mut buf = Buffer::empty(SCREEN);
        view.render_at(&mut buf, SCREEN, &Theme::dark(), now);
        buf
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_card_area_centres_at_rest() {
        let transform = StackTransform {
            translate_y: 0.0,
            scale: 1.0,
            opacity: 1.0,
            z_index: 1,
        };
        assert_eq!(
            card_area(SCREEN, (40, 10), &transform, 8.0),
            Rect::new(20, 7, 40, 10)
        );
    }

    #[test]
    fn test_card_area_scales_and_lifts() {
        let transform = StackTransform {
            translate_y: -24.0,
            scale: 0.95,
            opacity: 0.9,
            z_index: 1,
        };
        // 40 * 0.95 = 38, 10 * 0.95 = 9.5 -> 10, three rows up
        assert_eq!(
            card_area(SCREEN, (40, 10), &transform, 8.0),
            Rect::new(21, 4, 38, 10)
        );
    }

    #[test]
    fn test_card_area_stays_inside_container() {
        let transform = StackTransform {
            translate_y: -400.0,
            scale: 1.0,
            opacity: 1.0,
            z_index: 1,
        };
        let area = card_area(SCREEN, (120, 40), &transform, 8.0);
        assert_eq!(area, SCREEN);
    }

    #[test]
    fn test_view_requires_provider() {
        let result = DialogStackView::<DialogPanel>::new(
            DialogContext::detached(),
            StackConfig::default(),
            StackViewConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_tracks_registry() {
        let provider = provider();
        let mut view = view(&provider);
        assert!(view.front().is_none());

        provider.context().open_dialog("one").unwrap();
        assert!(view.refresh(Instant::now()));
        assert_eq!(view.front().map(|id| id.as_str()), Some("one"));
        assert!(!view.refresh(Instant::now()));
    }

    #[test]
    fn test_outside_pointer_down_clears_all() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        context.open_dialog("two").unwrap();
        context.open_dialog("three").unwrap();
        settle(&mut view);
        assert_eq!(view.front(), Some(&DialogId::from("three")));

        assert_eq!(view.handle_pointer_down(0, 0).unwrap(), PointerOutcome::Dismissed);
        assert!(context.open_ids().unwrap().is_empty());
    }

    #[test]
    fn test_inside_pointer_down_keeps_dialogs() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        settle(&mut view);

        assert_eq!(view.handle_pointer_down(40, 10).unwrap(), PointerOutcome::Inside);
        assert_eq!(context.open_ids().unwrap(), vec![DialogId::from("one")]);
    }

    #[test]
    fn test_pointer_down_with_nothing_open_is_ignored() {
        let provider = provider();
        let mut view = view(&provider);
        settle(&mut view);
        assert_eq!(view.handle_pointer_down(0, 0).unwrap(), PointerOutcome::Ignored);
    }

    #[test]
    fn test_clicking_action_runs_button() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        settle(&mut view);

        // card at (20, 7, 40, 10); actions row is y = 15, "[ Next ]" from x = 21
        assert_eq!(view.handle_pointer_down(22, 15).unwrap(), PointerOutcome::Action(0));
        assert!(context.is_open("two").unwrap());
    }

    #[test]
    fn test_escape_closes_front_only() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        context.open_dialog("two").unwrap();
        view.refresh(Instant::now());

        assert!(view.handle_key(key(KeyCode::Esc)).unwrap());
        assert_eq!(context.open_ids().unwrap(), vec![DialogId::from("one")]);
    }

    #[test]
    fn test_escape_can_be_disabled() {
        let provider = provider();
        let context = provider.context();
        let mut view = DialogStackView::new(
            context.clone(),
            StackConfig::default(),
            StackViewConfig {
                close_on_escape: false,
                ..StackViewConfig::default()
            },
        )
        .unwrap();
        context.open_dialog("one").unwrap();
        view.refresh(Instant::now());

        assert!(!view.handle_key(key(KeyCode::Esc)).unwrap());
        assert!(context.is_open("one").unwrap());
    }

    #[test]
    fn test_tab_cycles_actions_without_initial_focus() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        view.refresh(Instant::now());

        assert_eq!(view.selected_action(), None);
        assert!(!view.handle_key(key(KeyCode::Enter)).unwrap());

        view.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(view.selected_action(), Some(0));
        view.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(view.selected_action(), Some(1));
        view.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(view.selected_action(), Some(0));
        view.handle_key(key(KeyCode::BackTab)).unwrap();
        assert_eq!(view.selected_action(), Some(1));

        // "Close" closes dialog one
        assert!(view.handle_key(key(KeyCode::Enter)).unwrap());
        assert!(!context.is_open("one").unwrap());
    }

    #[test]
    fn test_selection_resets_when_front_changes() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        view.refresh(Instant::now());
        view.handle_key(key(KeyCode::Tab)).unwrap();

        context.open_dialog("two").unwrap();
        view.refresh(Instant::now());
        assert_eq!(view.selected_action(), None);
    }

    #[test]
    fn test_render_draws_back_card_above_front() {
        let provider = provider();
        let context = provider.context();
        let mut view = view(&provider);
        context.open_dialog("one").unwrap();
        context.open_dialog("two").unwrap();
        let buf = settle(&mut view);

        // back card "one" is lifted three rows and peeks out above "two"
        let top_row: String = (0..SCREEN.width)
            .map(|x| buf.get(x, 4).symbol().to_string())
            .collect();
        assert!(top_row.contains("One"));
        let front_row: String = (0..SCREEN.width)
            .map(|x| buf.get(x, 7).symbol().to_string())
            .collect();
        assert!(front_row.contains("Two"));
    }
}
