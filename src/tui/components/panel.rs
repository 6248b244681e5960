//! Dialog panel
//!
//! Dialog content drawn by the stack view. A panel is a bordered card with a
//! title, optional subtitle and description, a list of items and a row of
//! action buttons at the bottom.

use crate::dialog::{ButtonKind, DialogId};
use crate::tui::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget, Wrap},
};
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Drawing parameters for one dialog in the stack
#[derive(Debug, Clone, Copy)]
pub struct Paint<'a> {
    pub theme: &'a Theme,
    /// Effective opacity, already resolved from the stack transform
    pub opacity: f32,
    /// Whether this dialog is the front-most open dialog
    pub front: bool,
    /// Selected action index, only ever set on the front dialog
    pub selected_action: Option<usize>,
}

impl Paint<'_> {
    /// Theme colour at this dialog's opacity
    pub fn color(&self, color: Color) -> Color {
        self.theme.fade(color, self.opacity)
    }

    pub fn fg(&self, color: Color) -> Style {
        Style::default().fg(self.color(color))
    }
}

/// Content that can live in a dialog stack
pub trait StackContent: Send + Sync {
    /// Width and height at scale 1.0, in cells
    fn preferred_size(&self) -> (u16, u16) {
        (48, 12)
    }

    fn actions(&self) -> &[PanelAction] {
        &[]
    }

    /// Hit areas of the actions when drawn into `area`, in action order
    fn action_areas(&self, area: Rect) -> Vec<Rect> {
        let _ = area;
        Vec::new()
    }

    fn render(&self, buf: &mut Buffer, area: Rect, paint: &Paint<'_>);
}

/// Button shown at the bottom of a panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelAction {
    pub label: String,
    #[serde(default)]
    pub kind: ButtonKind,
    #[serde(default)]
    pub target: Option<DialogId>,
}

impl PanelAction {
    pub fn open(label: impl Into<String>, target: impl Into<DialogId>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Open,
            target: Some(target.into()),
        }
    }

    pub fn close(label: impl Into<String>, target: impl Into<DialogId>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Close,
            target: Some(target.into()),
        }
    }

    fn caption(&self) -> String {
        format!("[ {} ]", self.label)
    }
}

/// Card-style dialog content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogPanel {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub actions: Vec<PanelAction>,
    #[serde(default)]
    pub size: Option<(u16, u16)>,
}

impl DialogPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn action(mut self, action: PanelAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = Some((width, height));
        self
    }

    fn actions_row(area: Rect) -> Option<Rect> {
        let inner = inner_area(area);
        if inner.height < 2 || inner.width == 0 {
            return None;
        }
        Some(Rect::new(inner.x, inner.bottom() - 1, inner.width, 1))
    }
}

impl StackContent for DialogPanel {
    fn preferred_size(&self) -> (u16, u16) {
        self.size.unwrap_or((48, 12))
    }

    fn actions(&self) -> &[PanelAction] {
        &self.actions
    }

    fn action_areas(&self, area: Rect) -> Vec<Rect> {
        let Some(row) = Self::actions_row(area) else {
            return Vec::new();
        };

        let mut areas = Vec::with_capacity(self.actions.len());
        let mut x = row.x;
        for action in &self.actions {
            let width = action.caption().width() as u16;
            if x >= row.right() {
                break;
            }
            let width = width.min(row.right() - x);
            areas.push(Rect::new(x, row.y, width, 1));
            x = x.saturating_add(width + 1);
        }
        areas
    }

    fn render(&self, buf: &mut Buffer, area: Rect, paint: &Paint<'_>) {
        if area.width < 2 || area.height < 2 {
            return;
        }
        let theme = paint.theme;

        Clear.render(area, buf);

        let border = if paint.front {
            theme.border_focus
        } else {
            theme.border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(paint.fg(border))
            .style(Style::default().bg(paint.color(theme.bg_overlay)))
            .title(Span::styled(
                format!(" {} ", self.title),
                paint.fg(theme.fg_base).add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        block.render(area, buf);

        let has_actions = !self.actions.is_empty() && inner.height >= 2;
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(if has_actions {
                vec![Constraint::Min(0), Constraint::Length(1)]
            } else {
                vec![Constraint::Min(0)]
            })
            .split(inner);

        let mut lines = Vec::new();
        if let Some(subtitle) = &self.subtitle {
            lines.push(Line::from(Span::styled(
                subtitle.clone(),
                paint.fg(theme.fg_muted),
            )));
        }
        if let Some(description) = &self.description {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                description.clone(),
                paint.fg(theme.fg_base),
            )));
        }
        if !self.items.is_empty() {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            for item in &self.items {
                lines.push(Line::from(vec![
                    Span::styled("• ", paint.fg(theme.accent)),
                    Span::styled(item.clone(), paint.fg(theme.fg_base)),
                ]));
            }
        }
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(chunks[0], buf);

        if has_actions {
            for (index, (action, hit)) in self
                .actions
                .iter()
                .zip(self.action_areas(area))
                .enumerate()
            {
                let selected = paint.selected_action == Some(index);
                let style = match (selected, action.kind) {
                    (true, _) => Style::default()
                        .fg(paint.color(theme.bg_base))
                        .bg(paint.color(theme.primary))
                        .add_modifier(Modifier::BOLD),
                    (false, ButtonKind::Close) => paint.fg(theme.fg_muted),
                    (false, _) => paint.fg(theme.primary),
                };
                Paragraph::new(Span::styled(action.caption(), style)).render(hit, buf);
            }
        }
    }
}

fn inner_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> DialogPanel {
        DialogPanel::new("Settings")
            .subtitle("Preferences")
            .description("Pick how the stack behaves.")
            .item("Offsets")
            .action(PanelAction::open("Next", "two"))
            .action(PanelAction::close("Close", "one"))
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_action_areas_follow_captions() {
        let area = Rect::new(0, 0, 40, 10);
        let areas = panel().action_areas(area);

        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0], Rect::new(1, 8, 8, 1));
        assert_eq!(areas[1], Rect::new(10, 8, 9, 1));
    }

    #[test]
    fn test_action_areas_need_room() {
        assert!(panel().action_areas(Rect::new(0, 0, 40, 3)).is_empty());
    }

    #[test]
    fn test_render_draws_title_and_actions() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        let paint = Paint {
            theme: &theme,
            opacity: 1.0,
            front: true,
            selected_action: Some(0),
        };

        panel().render(&mut buf, area, &paint);
        let text = buffer_text(&buf);

        assert!(text.contains("Settings"));
        assert!(text.contains("Preferences"));
        assert!(text.contains("[ Next ]"));
        assert!(text.contains("[ Close ]"));
        assert_eq!(buf.get(1, 8).bg, theme.primary);
    }

    #[test]
    fn test_render_fades_with_opacity() {
        let theme = Theme::dark();
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        let paint = Paint {
            theme: &theme,
            opacity: 0.5,
            front: false,
            selected_action: None,
        };

        panel().render(&mut buf, area, &paint);
        assert_eq!(buf.get(0, 0).fg, theme.fade(theme.border, 0.5));
    }

    #[test]
    fn test_panel_deserializes() {
        let panel: DialogPanel = serde_json::from_str(
            r#"{"title":"One","actions":[{"label":"Next","kind":"open","target":"two"}]}"#,
        )
        .unwrap();
        assert_eq!(panel.actions[0], PanelAction::open("Next", "two"));
        assert_eq!(panel.preferred_size(), (48, 12));
    }
}
