use crate::config::Config;
use crate::dialog::{Dialog, DialogProvider, DialogTrigger};
use crate::docs::components::ExampleKind;
use crate::docs::{DocsLibrary, DocsRenderer};
use crate::tui::components::{
    docs::DocsView, Component, DialogPanel, DialogStackView, PanelAction,
};
use crate::tui::{events::Event, theme::Theme, Frame};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Examples in the order they are listed on the showcase screen
const EXAMPLES: [ExampleKind; 5] = [
    ExampleKind::Showcase,
    ExampleKind::Basic,
    ExampleKind::BasicWithAnimation,
    ExampleKind::Stacked,
    ExampleKind::Shared,
];

/// Which screen sits underneath the dialog stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Showcase,
    Docs,
}

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Current application dimensions
    pub size: Rect,

    pub mode: Mode,

    /// Status message to display
    pub status_message: Option<String>,

    theme: Theme,

    /// Owns the registry; the stack view and triggers only hold handles
    provider: DialogProvider<DialogPanel>,

    stack: DialogStackView<DialogPanel>,
    triggers: Vec<(char, DialogTrigger<DialogPanel>)>,
    docs: DocsView,

    /// Events posted by click handlers
    event_receiver: mpsc::UnboundedReceiver<Event>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let theme = config.theme();

        let provider = DialogProvider::new(showcase_dialogs())?;
        let stack = DialogStackView::new(provider.context(), config.stack, config.view)?;

        let triggers = EXAMPLES
            .iter()
            .map(|kind| {
                let target = kind.open_ids().first().copied().unwrap_or_default();
                let mut trigger = DialogTrigger::new(provider.context())
                    .dialog_id(target)
                    .label(kind.title());
                if *kind == ExampleKind::BasicWithAnimation {
                    let sender = event_sender.clone();
                    let transition = config.stack.transition;
                    trigger = trigger.on_click(move || {
                        let ease = transition.ease;
                        let _ = sender.send(Event::StatusMessage(format!(
                            "Animating with cubic-bezier({}, {}, {}, {}) over {}",
                            ease.x1,
                            ease.y1,
                            ease.x2,
                            ease.y2,
                            humantime::format_duration(transition.duration)
                        )));
                    });
                }
                (kind.showcase_key(), trigger)
            })
            .collect();

        let library = DocsLibrary::load(config.docs_dir.as_deref())
            .context("Failed to load documentation pages")?;
        let renderer = DocsRenderer::new(&theme, config.highlight_config(), config.stack)?;
        let docs = DocsView::new(library, renderer);

        Ok(Self {
            should_quit: false,
            size: Rect::default(),
            mode: Mode::Showcase,
            status_message: None,
            theme,
            provider,
            stack,
            triggers,
            docs,
            event_receiver,
        })
    }

    /// Handle incoming events, returning whether the app should exit
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => self.handle_key(key_event).await?,
            Event::Mouse(mouse_event) => self.handle_mouse(mouse_event).await?,
            Event::Resize(width, height) => {
                self.size = Rect::new(0, 0, width, height);
                self.stack.set_size(self.size);
                self.docs.set_size(self.size);
            }
            Event::Tick => self.stack.tick().await?,
            Event::StatusMessage(message) => self.status_message = Some(message),
        }

        while let Ok(internal) = self.event_receiver.try_recv() {
            if let Event::StatusMessage(message) = internal {
                self.status_message = Some(message);
            }
        }

        Ok(self.should_quit)
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        // the front dialog sees keys before the screen beneath it
        if self.stack.handle_key_event(key).await? {
            return Ok(());
        }

        if let KeyCode::Char(c) = key.code {
            if let Some((_, trigger)) = self.triggers.iter_mut().find(|(k, _)| *k == c) {
                debug!("Trigger '{}' activated", trigger.text());
                trigger.click()?;
                return Ok(());
            }
        }

        match (self.mode, key.code) {
            (_, KeyCode::Char('q')) => self.should_quit = true,
            (_, KeyCode::Char('c')) => {
                self.provider.context().clear_dialogs()?;
                self.status_message = None;
            }
            (Mode::Showcase, KeyCode::Char('d')) => {
                info!("Switching to docs");
                self.mode = Mode::Docs;
            }
            (Mode::Docs, KeyCode::Char('d') | KeyCode::Esc) => self.mode = Mode::Showcase,
            (Mode::Docs, _) => {
                self.docs.handle_key_event(key).await?;
            }
            _ => {}
        }
        Ok(())
    }

    async fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        if self.stack.handle_mouse_event(mouse).await? {
            return Ok(());
        }
        if self.mode == Mode::Docs {
            self.docs.handle_mouse_event(mouse).await?;
        }
        Ok(())
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        self.size = frame.size();
        let now = Instant::now();
        // the screen beneath lists the stack, so pick up registry changes first
        self.stack.refresh(now);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(frame.size());

        self.render_header(frame, chunks[0]);
        match self.mode {
            Mode::Showcase => self.render_showcase(frame, chunks[1]),
            Mode::Docs => self.docs.render(frame, chunks[1], &self.theme),
        }
        self.render_status_bar(frame, chunks[2]);

        self.stack
            .render_at(frame.buffer_mut(), chunks[1], &self.theme, now);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let tab = |label: &'static str, active: bool| {
            if active {
                Span::styled(
                    format!(" {} ", label),
                    Style::default()
                        .fg(self.theme.bg_base)
                        .bg(self.theme.primary)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::styled(format!(" {} ", label), self.theme.muted())
            }
        };

        let header = Line::from(vec![
            Span::styled(" toldo ", self.theme.title()),
            tab("Showcase", self.mode == Mode::Showcase),
            tab("Docs", self.mode == Mode::Docs),
        ]);
        frame.render_widget(
            Paragraph::new(header).style(Style::default().bg(self.theme.bg_subtle)),
            area,
        );
    }

    fn render_showcase(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled("Stacked dialogs", self.theme.title())),
            Line::default(),
        ];

        for kind in EXAMPLES {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  [{}] ", kind.showcase_key()),
                    Style::default().fg(self.theme.accent),
                ),
                Span::styled(kind.title(), self.theme.base()),
            ]));
        }

        lines.push(Line::default());
        let layout = self.stack.layout();
        if layout.is_empty() {
            lines.push(Line::from(Span::styled("  No dialogs open", self.theme.muted())));
        } else {
            lines.push(Line::from(Span::styled("  Open stack", self.theme.muted())));
            for entry in layout.entries() {
                lines.push(Line::from(Span::styled(
                    format!(
                        "  {:<12} position {}  z {}  y {:>5.1}  scale {:.2}  opacity {:.2}",
                        entry.id.as_str(),
                        entry.position,
                        entry.target.z_index,
                        entry.target.translate_y,
                        entry.target.scale,
                        entry.target.opacity
                    ),
                    self.theme.base(),
                )));
            }
        }

        frame.render_widget(
            Paragraph::new(lines).style(Style::default().bg(self.theme.bg_base)),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_text = match &self.status_message {
            Some(message) => message.clone(),
            None => match self.mode {
                Mode::Showcase => {
                    "1-5 open | Tab/Enter actions | Esc close | c clear | d docs | q quit".to_string()
                }
                Mode::Docs => format!(
                    "{} | j/k scroll | [ ] pages | t contents | d back | q quit",
                    self.docs.selected_slug().unwrap_or("no pages")
                ),
            },
        };

        frame.render_widget(
            Paragraph::new(status_text).style(
                Style::default()
                    .fg(self.theme.fg_muted)
                    .bg(self.theme.bg_subtle),
            ),
            area,
        );
    }

    pub fn stack(&self) -> &DialogStackView<DialogPanel> {
        &self.stack
    }
}

/// Dialogs of the showcase, in registration order
pub fn showcase_dialogs() -> Vec<Dialog<DialogPanel>> {
    vec![
        Dialog::new(
            "profile",
            DialogPanel::new("Profile")
                .subtitle("Ada Lovelace")
                .description("Edit how others see you.")
                .item("Handle: @ada")
                .item("Role: Analyst")
                .action(PanelAction::open("Settings", "settings"))
                .action(PanelAction::close("Close", "profile")),
        ),
        Dialog::new(
            "settings",
            DialogPanel::new("Settings")
                .description("Opened on top of the profile. The card behind steps back.")
                .item("Notifications: on")
                .item("Theme: follows terminal")
                .action(PanelAction::open("Delete account", "confirm"))
                .action(PanelAction::close("Back", "settings")),
        ),
        Dialog::new(
            "confirm",
            DialogPanel::new("Are you sure?")
                .description("Three dialogs deep. Click outside to close them all.")
                .action(PanelAction::close("Cancel", "confirm"))
                .with_size(40, 8),
        ),
        Dialog::new(
            "basic",
            DialogPanel::new("Basic dialog")
                .description("A single dialog. Esc or Close dismisses it.")
                .action(PanelAction::close("Close", "basic"))
                .with_size(44, 8),
        ),
        Dialog::new(
            "stacked-1",
            DialogPanel::new("Step 1")
                .description("Each step opens the next one on top.")
                .action(PanelAction::open("Next", "stacked-2"))
                .action(PanelAction::close("Close", "stacked-1")),
        ),
        Dialog::new(
            "stacked-2",
            DialogPanel::new("Step 2")
                .description("The first step is now one rank back.")
                .action(PanelAction::open("Next", "stacked-3"))
                .action(PanelAction::close("Back", "stacked-2")),
        ),
        Dialog::new(
            "stacked-3",
            DialogPanel::new("Step 3")
                .description("Cards behind the second rank fade out.")
                .action(PanelAction::close("Back", "stacked-3")),
        ),
        Dialog::new(
            "shared",
            DialogPanel::new("Shared content")
                .subtitle("One panel type, many dialogs")
                .item("Title")
                .item("Subtitle")
                .item("Description")
                .item("Actions")
                .action(PanelAction::close("Done", "shared")),
        ),
    ]
}
