use crate::tui::theme::Theme;
use ratatui::style::{Modifier, Style};

/// Styles for rendered documentation
#[derive(Debug, Clone)]
pub struct DocsStyles {
    pub text: Style,

    pub heading_1: Style,
    pub heading_2: Style,
    pub heading_3: Style,
    pub heading_minor: Style,

    pub emphasis: Style,
    pub strong: Style,
    pub strikethrough: Style,

    pub inline_code: Style,
    pub code_border: Style,
    pub code_language: Style,

    pub list_marker: Style,
    pub task_marker: Style,

    pub quote_marker: Style,
    pub quote_text: Style,

    pub link: Style,
    pub link_url: Style,
    pub image: Style,

    pub table_header: Style,
    pub table_border: Style,

    pub rule: Style,
    pub footnote: Style,

    pub caption: Style,
    pub frame: Style,
    pub frame_title: Style,
    pub preview_label: Style,
    pub preview_value: Style,
}

impl DocsStyles {
    pub fn from_theme(theme: &Theme) -> Self {
        let muted = Style::default().fg(theme.fg_muted);
        let subtle = Style::default().fg(theme.fg_subtle);

        Self {
            text: Style::default().fg(theme.fg_base),

            heading_1: Style::default()
                .fg(theme.fg_base)
                .add_modifier(Modifier::BOLD),
            heading_2: Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
            heading_3: Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
            heading_minor: Style::default()
                .fg(theme.fg_base)
                .add_modifier(Modifier::BOLD),

            emphasis: Style::default().add_modifier(Modifier::ITALIC),
            strong: Style::default().add_modifier(Modifier::BOLD),
            strikethrough: Style::default().add_modifier(Modifier::CROSSED_OUT),

            inline_code: Style::default().fg(theme.fg_muted).bg(theme.bg_subtle),
            code_border: subtle,
            code_language: subtle.add_modifier(Modifier::ITALIC),

            list_marker: Style::default().fg(theme.accent),
            task_marker: Style::default().fg(theme.success),

            quote_marker: Style::default().fg(theme.border),
            quote_text: muted,

            link: muted.add_modifier(Modifier::UNDERLINED),
            link_url: subtle,
            image: Style::default().fg(theme.secondary),

            table_header: Style::default()
                .fg(theme.fg_base)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(theme.border),

            rule: Style::default().fg(theme.border),
            footnote: subtle,

            caption: muted.add_modifier(Modifier::ITALIC),
            frame: Style::default().fg(theme.border),
            frame_title: muted.add_modifier(Modifier::BOLD),
            preview_label: muted,
            preview_value: Style::default().fg(theme.primary),
        }
    }
}

impl Default for DocsStyles {
    fn default() -> Self {
        Self::from_theme(&Theme::default())
    }
}
