//! Embedded documentation components
//!
//! Pages may embed MDX-style tags such as `<StackedExample />` or
//! `<Window title="Demo">`. This module tokenizes those tags and renders the
//! self-contained ones; framing containers are handled by the renderer.

use super::styles::DocsStyles;
use crate::dialog::{DialogId, StackConfig, StackLayout, StackTransform};
use anyhow::{Context, Result};
use ratatui::text::{Line, Span};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

/// Piece of an HTML fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    Open {
        name: String,
        attrs: BTreeMap<String, String>,
        self_closing: bool,
    },
    Close {
        name: String,
    },
    Text(String),
}

/// Splits HTML fragments into tags and text
#[derive(Debug, Clone)]
pub struct TagParser {
    comment: Regex,
    tag: Regex,
    attr: Regex,
}

impl TagParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment: Regex::new(r"(?s)<!--.*?-->").context("Failed to compile comment pattern")?,
            tag: Regex::new(r"<(/)?([A-Za-z][A-Za-z0-9_-]*)([^>]*?)(/)?>")
                .context("Failed to compile tag pattern")?,
            attr: Regex::new(r#"([A-Za-z_:][A-Za-z0-9_:.-]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'))?"#)
                .context("Failed to compile attribute pattern")?,
        })
    }

    /// Split `html` into tokens, dropping comments
    pub fn tokenize(&self, html: &str) -> Vec<HtmlToken> {
        let html = self.comment.replace_all(html, "");
        let html = html.as_ref();
        let mut tokens = Vec::new();
        let mut last = 0;

        for captures in self.tag.captures_iter(html) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                tokens.push(HtmlToken::Text(html[last..whole.start()].to_string()));
            }
            last = whole.end();

            let name = captures[2].to_string();
            if captures.get(1).is_some() {
                tokens.push(HtmlToken::Close { name });
                continue;
            }

            let attrs = captures
                .get(3)
                .map(|raw| self.attributes(raw.as_str()))
                .unwrap_or_default();
            tokens.push(HtmlToken::Open {
                name,
                attrs,
                self_closing: captures.get(4).is_some(),
            });
        }

        if last < html.len() {
            tokens.push(HtmlToken::Text(html[last..].to_string()));
        }
        tokens
    }

    fn attributes(&self, raw: &str) -> BTreeMap<String, String> {
        self.attr
            .captures_iter(raw)
            .map(|captures| {
                let value = captures
                    .get(2)
                    .or_else(|| captures.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                (captures[1].to_string(), value)
            })
            .collect()
    }
}

/// Layout previews available to pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExampleKind {
    Showcase,
    Shared,
    Basic,
    BasicWithAnimation,
    Stacked,
}

impl ExampleKind {
    pub fn title(&self) -> &'static str {
        match self {
            ExampleKind::Showcase => "Showcase",
            ExampleKind::Shared => "Shared content",
            ExampleKind::Basic => "Basic dialog",
            ExampleKind::BasicWithAnimation => "Basic dialog with animation",
            ExampleKind::Stacked => "Stacked dialogs",
        }
    }

    /// Dialogs open in the preview, in registration order
    pub fn open_ids(&self) -> &'static [&'static str] {
        match self {
            ExampleKind::Showcase => &["profile", "settings", "confirm"],
            ExampleKind::Shared => &["shared"],
            ExampleKind::Basic | ExampleKind::BasicWithAnimation => &["basic"],
            ExampleKind::Stacked => &["stacked-1", "stacked-2", "stacked-3"],
        }
    }

    /// Showcase key that opens the example live
    pub fn showcase_key(&self) -> char {
        match self {
            ExampleKind::Showcase => '1',
            ExampleKind::Basic => '2',
            ExampleKind::BasicWithAnimation => '3',
            ExampleKind::Stacked => '4',
            ExampleKind::Shared => '5',
        }
    }
}

/// What a tag name stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Example(ExampleKind),
    PropsTable,
    /// Framed block with an optional title
    Container,
    Caption,
    InlineCode,
}

pub fn component_kind(name: &str) -> Option<ComponentKind> {
    let kind = match name {
        "ShowcaseExample" => ComponentKind::Example(ExampleKind::Showcase),
        "SharedExample" => ComponentKind::Example(ExampleKind::Shared),
        "BasicExample" => ComponentKind::Example(ExampleKind::Basic),
        "BasicWithAnimationExample" => ComponentKind::Example(ExampleKind::BasicWithAnimation),
        "StackedExample" => ComponentKind::Example(ExampleKind::Stacked),
        "PropsTable" => ComponentKind::PropsTable,
        "ComponentContainer" | "Window" => ComponentKind::Container,
        "figcaption" => ComponentKind::Caption,
        "Code" => ComponentKind::InlineCode,
        _ => return None,
    };
    Some(kind)
}

/// Live preview of an example's settled stack
pub fn render_example(kind: ExampleKind, config: &StackConfig, styles: &DocsStyles) -> Vec<Line<'static>> {
    let open: Vec<DialogId> = kind.open_ids().iter().map(|id| DialogId::from(*id)).collect();
    let layout = StackLayout::compute(&open, config);

    let mut lines = vec![Line::from(vec![
        Span::styled("▣ ", styles.preview_value),
        Span::styled(kind.title().to_string(), styles.heading_minor),
    ])];

    let headers = ["dialog", "position", "y", "scale", "opacity", "z"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = layout
        .entries()
        .iter()
        .map(|entry| {
            let t = &entry.target;
            vec![
                entry.id.to_string(),
                entry.position.to_string(),
                format!("{:.0}", t.translate_y),
                format!("{:.2}", t.scale),
                format!("{:.2}", t.opacity),
                t.z_index.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    lines.extend(render_table(&headers, &rows, styles));

    if kind == ExampleKind::BasicWithAnimation {
        if let Some(entry) = layout.front() {
            let transition = &entry.transition;
            let ease: [f32; 4] = transition.ease.into();
            lines.push(Line::from(vec![
                Span::styled("enters from ", styles.preview_label),
                Span::styled(describe(&entry.initial), styles.preview_value),
                Span::styled(" to ", styles.preview_label),
                Span::styled(describe(&entry.target), styles.preview_value),
            ]));
            lines.push(Line::from(vec![
                Span::styled("over ", styles.preview_label),
                Span::styled(
                    humantime::format_duration(transition.duration).to_string(),
                    styles.preview_value,
                ),
                Span::styled(" with cubic-bezier ", styles.preview_label),
                Span::styled(format!("{:?}", ease), styles.preview_value),
            ]));
        }
    }

    lines.push(Line::from(Span::styled(
        format!("Press {} in the showcase to open it live.", kind.showcase_key()),
        styles.caption,
    )));
    lines
}

fn describe(transform: &StackTransform) -> String {
    format!(
        "y {:.0} · scale {:.2} · opacity {:.2}",
        transform.translate_y, transform.scale, transform.opacity
    )
}

/// One row of a `PropsTable`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropRow {
    pub prop: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Render the JSON rows in a `PropsTable` `data` attribute
pub fn render_props_table(data: &str, styles: &DocsStyles) -> Result<Vec<Line<'static>>> {
    let rows: Vec<PropRow> =
        serde_json::from_str(data).context("PropsTable data is not a JSON array of props")?;

    let headers = ["Prop", "Type", "Default", "Description"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let cells = rows
        .into_iter()
        .map(|row| {
            vec![
                row.prop,
                row.kind,
                row.default.unwrap_or_else(|| "-".to_string()),
                row.description,
            ]
        })
        .collect::<Vec<_>>();
    Ok(render_table(&headers, &cells, styles))
}

/// Box-drawn table sized to its widest cells
pub fn render_table(headers: &[String], rows: &[Vec<String>], styles: &DocsStyles) -> Vec<Line<'static>> {
    let columns = headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![0usize; columns];
    for row in std::iter::once(headers).chain(rows.iter().map(Vec::as_slice)) {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.width());
        }
    }

    let border = |left: &str, mid: &str, right: &str| {
        let body = widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect::<Vec<_>>()
            .join(mid);
        Line::from(Span::styled(format!("{}{}{}", left, body, right), styles.table_border))
    };
    let row_line = |cells: &[String], style| {
        let mut spans = vec![Span::styled("│", styles.table_border)];
        for (index, width) in widths.iter().enumerate() {
            let cell = cells.get(index).map(String::as_str).unwrap_or("");
            let padding = width.saturating_sub(cell.width());
            spans.push(Span::styled(format!(" {}{} ", cell, " ".repeat(padding)), style));
            spans.push(Span::styled("│", styles.table_border));
        }
        Line::from(spans)
    };

    let mut lines = vec![border("┌", "┬", "┐")];
    if !headers.is_empty() {
        lines.push(row_line(headers, styles.table_header));
        lines.push(border("├", "┼", "┤"));
    }
    for row in rows {
        lines.push(row_line(row, styles.text));
    }
    lines.push(border("└", "┴", "┘"));
    lines
}
