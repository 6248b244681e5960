//! Code block highlighting with syntect

use anyhow::{anyhow, Result};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use syntect::{
    easy::HighlightLines,
    highlighting::{FontStyle, Theme as SyntectTheme, ThemeSet},
    parsing::{SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

pub const DARK_THEME: &str = "base16-ocean.dark";
pub const LIGHT_THEME: &str = "InspiredGitHub";

/// Configuration for code highlighting
#[derive(Debug, Clone)]
pub struct HighlightConfig {
    /// Language assumed for fences without an info string
    pub default_lang: String,
    /// syntect theme name
    pub theme: String,
    pub tab_width: usize,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            default_lang: "rust".to_string(),
            theme: DARK_THEME.to_string(),
            tab_width: 4,
        }
    }
}

impl HighlightConfig {
    /// Theme matching a dark or light UI
    pub fn for_ui(dark: bool, default_lang: impl Into<String>) -> Self {
        Self {
            default_lang: default_lang.into(),
            theme: if dark { DARK_THEME } else { LIGHT_THEME }.to_string(),
            ..Self::default()
        }
    }
}

/// Syntax highlighter for fenced code
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    config: HighlightConfig,
}

impl Highlighter {
    pub fn new(config: HighlightConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            config,
        }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Highlight `code`, falling back to the default language when `lang` is
    /// missing and to plain text when it is unknown.
    ///
    /// Only foreground colours and font styles are applied; the theme
    /// background is never painted.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> Result<Vec<Line<'static>>> {
        let syntax = self.find_syntax(lang);
        let theme = self.theme()?;
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut lines = Vec::new();
        for line in LinesWithEndings::from(code) {
            let regions = highlighter.highlight_line(line, &self.syntax_set)?;
            let spans: Vec<Span<'static>> = regions
                .iter()
                .map(|(style, text)| {
                    let text = text
                        .trim_end_matches(['\n', '\r'])
                        .replace('\t', &" ".repeat(self.config.tab_width));
                    Span::styled(text, convert_style(style))
                })
                .filter(|span| !span.content.is_empty())
                .collect();
            lines.push(Line::from(spans));
        }
        Ok(lines)
    }

    /// Name of the syntax used for `lang`
    pub fn syntax_name(&self, lang: Option<&str>) -> &str {
        &self.find_syntax(lang).name
    }

    fn find_syntax(&self, lang: Option<&str>) -> &SyntaxReference {
        let lang = lang
            .map(str::trim)
            .filter(|lang| !lang.is_empty())
            .unwrap_or(self.config.default_lang.as_str());
        let lang = lang.split([',', ' ', '{']).next().unwrap_or(lang);

        self.syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .or_else(|| self.syntax_set.find_syntax_by_name(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    fn theme(&self) -> Result<&SyntectTheme> {
        self.theme_set
            .themes
            .get(&self.config.theme)
            .or_else(|| self.theme_set.themes.get(DARK_THEME))
            .ok_or_else(|| anyhow!("Highlight theme not found: {}", self.config.theme))
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn convert_style(style: &syntect::highlighting::Style) -> Style {
    let fg = style.foreground;
    let mut converted = Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b));
    if style.font_style.contains(FontStyle::BOLD) {
        converted = converted.add_modifier(Modifier::BOLD);
    }
    if style.font_style.contains(FontStyle::ITALIC) {
        converted = converted.add_modifier(Modifier::ITALIC);
    }
    if style.font_style.contains(FontStyle::UNDERLINE) {
        converted = converted.add_modifier(Modifier::UNDERLINED);
    }
    converted
}
