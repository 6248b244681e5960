use anyhow::Result;
use crossterm::event::{Event as CrosstermEvent, KeyEvent, MouseEvent};
use std::time::Duration;

/// Application events
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input event
    Key(KeyEvent),

    /// Mouse input event
    Mouse(MouseEvent),

    /// Terminal resize event
    Resize(u16, u16),

    /// Periodic tick event, drives animation frames
    Tick,

    /// Status message event
    StatusMessage(String),
}

/// Event handler for managing input events
pub struct EventHandler {
    tick_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_interval: Duration) -> Self {
        Self { tick_interval }
    }

    /// Get the next event, or a tick when nothing arrives within the interval
    pub async fn next(&mut self) -> Result<Event> {
        let tick_interval = self.tick_interval;
        let polled = tokio::task::spawn_blocking(move || -> std::io::Result<Option<CrosstermEvent>> {
            if crossterm::event::poll(tick_interval)? {
                Ok(Some(crossterm::event::read()?))
            } else {
                Ok(None)
            }
        })
        .await??;

        Ok(polled
            .and_then(Self::convert_crossterm_event)
            .unwrap_or(Event::Tick))
    }

    fn convert_crossterm_event(event: CrosstermEvent) -> Option<Event> {
        match event {
            CrosstermEvent::Key(key_event) => Some(Event::Key(key_event)),
            CrosstermEvent::Mouse(mouse_event) => Some(Event::Mouse(mouse_event)),
            CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
            CrosstermEvent::FocusGained | CrosstermEvent::FocusLost | CrosstermEvent::Paste(_) => None,
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(16))
    }
}
