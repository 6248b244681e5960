pub mod docs;
pub mod panel;
pub mod stack;

pub use panel::{DialogPanel, Paint, PanelAction, StackContent};
pub use stack::{DialogStackView, PointerOutcome, StackViewConfig};

use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

/// Base trait for all UI components
#[async_trait]
pub trait Component: Send + Sync {
    /// Handle keyboard input, returning whether the event was consumed
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        let _ = event;
        Ok(false)
    }

    /// Handle mouse input, returning whether the event was consumed
    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        let _ = event;
        Ok(false)
    }

    /// Handle periodic updates
    async fn tick(&mut self) -> Result<()> {
        Ok(())
    }

    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Get component dimensions
    fn size(&self) -> Rect;

    /// Set component dimensions
    fn set_size(&mut self, size: Rect);
}

/// Base component state
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    pub size: Rect,
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }
}
