//! Documentation viewer: page list on the left, rendered page on the right

use super::{Component, ComponentState};
use crate::docs::{DocsLibrary, DocsRenderer, RenderedDoc};
use crate::tui::{theme::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use tracing::warn;

const SIDEBAR_WIDTH: u16 = 26;

pub struct DocsView {
    state: ComponentState,
    library: DocsLibrary,
    renderer: DocsRenderer,
    selected: usize,
    scroll: u16,
    show_toc: bool,
    cache: Option<(usize, u16, RenderedDoc)>,
}

impl DocsView {
    pub fn new(library: DocsLibrary, renderer: DocsRenderer) -> Self {
        Self {
            state: ComponentState::new(),
            library,
            renderer,
            selected: 0,
            scroll: 0,
            show_toc: false,
            cache: None,
        }
    }

    pub fn selected_slug(&self) -> Option<&str> {
        self.library.pages().get(self.selected).map(|p| p.slug.as_str())
    }

    pub fn next_page(&mut self) {
        if !self.library.is_empty() {
            self.selected = (self.selected + 1) % self.library.len();
            self.scroll = 0;
        }
    }

    pub fn previous_page(&mut self) {
        if !self.library.is_empty() {
            self.selected = (self.selected + self.library.len() - 1) % self.library.len();
            self.scroll = 0;
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self
            .cache
            .as_ref()
            .map(|(_, _, doc)| doc.text.lines.len().saturating_sub(1) as i32)
            .unwrap_or(0);
        self.scroll = (self.scroll as i32 + delta).clamp(0, max.max(0)) as u16;
    }

    fn rendered(&mut self, width: u16) -> Option<&RenderedDoc> {
        let stale = !matches!(&self.cache, Some((index, w, _)) if *index == self.selected && *w == width);
        if stale {
            let page = self.library.pages().get(self.selected)?;
            match self.renderer.render(&page.body, width) {
                Ok(doc) => self.cache = Some((self.selected, width, doc)),
                Err(e) => {
                    warn!("Failed to render page '{}': {:#}", page.slug, e);
                    self.cache = None;
                }
            }
        }
        self.cache.as_ref().map(|(_, _, doc)| doc)
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines: Vec<Line> = self
            .library
            .pages()
            .iter()
            .enumerate()
            .map(|(index, page)| {
                if index == self.selected {
                    Line::from(Span::styled(
                        format!("▸ {}", page.title()),
                        Style::default()
                            .fg(theme.primary)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(format!("  {}", page.title()), theme.muted()))
                }
            })
            .collect();

        let sidebar = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::RIGHT)
                .border_style(Style::default().fg(theme.border)),
        );
        frame.render_widget(sidebar, area);
    }
}

#[async_trait]
impl Component for DocsView {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        if event.kind == KeyEventKind::Release {
            return Ok(false);
        }
        match event.code {
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(10),
            KeyCode::PageUp => self.scroll_by(-10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::Right | KeyCode::Char(']') | KeyCode::Char('n') => self.next_page(),
            KeyCode::Left | KeyCode::Char('[') | KeyCode::Char('p') => self.previous_page(),
            KeyCode::Char('t') => self.show_toc = !self.show_toc,
            _ => return Ok(false),
        }
        Ok(true)
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        match event.kind {
            MouseEventKind::ScrollDown => self.scroll_by(3),
            MouseEventKind::ScrollUp => self.scroll_by(-3),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        self.state.size = area;
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
            .split(area);

        self.render_sidebar(frame, chunks[0], theme);

        let content_area = chunks[1].inner(&ratatui::layout::Margin {
            horizontal: 2,
            vertical: 0,
        });
        let show_toc = self.show_toc;
        let scroll = self.scroll;
        let styles = self.renderer.styles().clone();
        let Some(doc) = self.rendered(content_area.width) else {
            frame.render_widget(
                Paragraph::new("No documentation pages found.").style(theme.muted()),
                content_area,
            );
            return;
        };

        let text = if show_toc {
            let mut lines = vec![Line::from(Span::styled("Contents", styles.heading_2))];
            lines.extend(doc.toc(&styles));
            ratatui::text::Text::from(lines)
        } else {
            doc.text.clone()
        };

        frame.render_widget(
            Paragraph::new(text)
                .wrap(Wrap { trim: false })
                .scroll((if show_toc { 0 } else { scroll }, 0)),
            content_area,
        );
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::StackConfig;
    use crate::docs::{DocsPage, HighlightConfig};

    fn view() -> DocsView {
        let library = DocsLibrary::from_pages(vec![
            DocsPage::parse("a", "---\norder: 1\n---\n# A\n\nfirst\n").unwrap(),
            DocsPage::parse("b", "---\norder: 2\n---\n# B\n").unwrap(),
        ]);
        let renderer = DocsRenderer::new(
            &Theme::dark(),
            HighlightConfig::default(),
            StackConfig::default(),
        )
        .unwrap();
        DocsView::new(library, renderer)
    }

    #[test]
    fn test_page_navigation_wraps() {
        let mut view = view();
        assert_eq!(view.selected_slug(), Some("a"));
        view.next_page();
        assert_eq!(view.selected_slug(), Some("b"));
        view.next_page();
        assert_eq!(view.selected_slug(), Some("a"));
        view.previous_page();
        assert_eq!(view.selected_slug(), Some("b"));
    }

    #[test]
    fn test_render_is_cached_per_width() {
        let mut view = view();
        assert!(view.rendered(40).is_some());
        assert!(matches!(view.cache, Some((0, 40, _))));
        view.next_page();
        view.rendered(40);
        assert!(matches!(view.cache, Some((1, 40, _))));
    }
}
