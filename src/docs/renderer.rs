//! Markdown to terminal text
//!
//! Walks pulldown-cmark events and builds ratatui [`Text`], expanding
//! embedded components and highlighting fenced code on the way.

use super::components::{
    component_kind, render_example, render_props_table, render_table, ComponentKind, HtmlToken,
    TagParser,
};
use super::highlight::{HighlightConfig, Highlighter};
use super::slug::Slugger;
use super::styles::DocsStyles;
use crate::dialog::StackConfig;
use crate::tui::theme::Theme;
use anyhow::Result;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::Style,
    text::{Line, Span, Text},
};
use std::collections::BTreeMap;
use tracing::warn;
use unicode_width::UnicodeWidthStr;

/// Heading found while rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub slug: String,
    /// Index of the heading in the rendered lines
    pub line: usize,
}

/// Rendered page plus its table of contents
#[derive(Debug, Clone)]
pub struct RenderedDoc {
    pub text: Text<'static>,
    pub headings: Vec<Heading>,
}

impl RenderedDoc {
    /// Rendered lines without styling
    pub fn plain_lines(&self) -> Vec<String> {
        self.text
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    /// Table of contents, indented by heading level
    pub fn toc(&self, styles: &DocsStyles) -> Vec<Line<'static>> {
        self.headings
            .iter()
            .map(|heading| {
                Line::from(vec![
                    Span::raw("  ".repeat(heading.level.saturating_sub(1) as usize)),
                    Span::styled(heading.text.clone(), styles.text),
                    Span::styled(format!("  #{}", heading.slug), styles.link_url),
                ])
            })
            .collect()
    }
}

#[derive(Debug)]
struct CodeBlock {
    lang: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
struct TableState {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    current_row: Vec<String>,
    current_cell: String,
}

/// Rendering state for one document
struct RenderContext {
    current_line: Vec<Span<'static>>,
    lines: Vec<Line<'static>>,
    last_blank: bool,
    style_stack: Vec<Style>,
    list_stack: Vec<Option<u64>>,
    quote_depth: usize,
    frame_depth: usize,
    caption: bool,
    code: Option<CodeBlock>,
    table: Option<TableState>,
    heading: Option<(HeadingLevel, String)>,
    links: Vec<String>,
    html_block: Option<String>,
    slugger: Slugger,
    headings: Vec<Heading>,
    width: usize,
}

impl RenderContext {
    fn new(width: u16) -> Self {
        Self {
            current_line: Vec::new(),
            lines: Vec::new(),
            last_blank: false,
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            quote_depth: 0,
            frame_depth: 0,
            caption: false,
            code: None,
            table: None,
            heading: None,
            links: Vec::new(),
            html_block: None,
            slugger: Slugger::new(),
            headings: Vec::new(),
            width: width.max(20) as usize,
        }
    }
}

/// Core documentation renderer
pub struct DocsRenderer {
    styles: DocsStyles,
    highlighter: Highlighter,
    tags: TagParser,
    stack: StackConfig,
}

impl DocsRenderer {
    pub fn new(theme: &Theme, highlight: HighlightConfig, stack: StackConfig) -> Result<Self> {
        Ok(Self {
            styles: DocsStyles::from_theme(theme),
            highlighter: Highlighter::new(highlight),
            tags: TagParser::new()?,
            stack,
        })
    }

    pub fn styles(&self) -> &DocsStyles {
        &self.styles
    }

    /// Render markdown for a viewport `width` cells wide
    pub fn render(&self, markdown: &str, width: u16) -> Result<RenderedDoc> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_FOOTNOTES);

        let mut context = RenderContext::new(width);
        for event in Parser::new_ext(markdown, options) {
            self.process_event(event, &mut context)?;
        }

        self.flush_current_line(&mut context);
        while context.last_blank && context.lines.len() > 1 {
            context.lines.pop();
            context.last_blank = context
                .lines
                .last()
                .map(|line| line.width() == 0)
                .unwrap_or(false);
        }

        Ok(RenderedDoc {
            text: Text::from(context.lines),
            headings: context.headings,
        })
    }

    fn process_event(&self, event: Event<'_>, context: &mut RenderContext) -> Result<()> {
        match event {
            Event::Start(tag) => self.handle_start_tag(tag, context),
            Event::End(tag_end) => self.handle_end_tag(tag_end, context)?,
            Event::Text(text) => self.handle_text(text, context),
            Event::Code(code) => self.handle_inline_code(code, context),
            Event::Html(html) => match context.html_block.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.handle_html(&html, true, context),
            },
            Event::InlineHtml(html) => self.handle_html(&html, false, context),
            Event::SoftBreak => self.push_text(" ".to_string(), context),
            Event::HardBreak => self.flush_current_line(context),
            Event::Rule => self.handle_rule(context),
            Event::FootnoteReference(label) => {
                let span = Span::styled(format!("[{}]", label), self.styles.footnote);
                context.current_line.push(span);
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "☑ " } else { "☐ " };
                context
                    .current_line
                    .push(Span::styled(marker, self.styles.task_marker));
            }
        }
        Ok(())
    }

    fn handle_start_tag(&self, tag: Tag<'_>, context: &mut RenderContext) {
        match tag {
            Tag::Paragraph => {
                if context.list_stack.is_empty() {
                    self.flush_current_line(context);
                    self.ensure_blank_line(context);
                }
            }
            Tag::Heading { level, .. } => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                let prefix = match level {
                    HeadingLevel::H1 => "",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    HeadingLevel::H4 => "#### ",
                    HeadingLevel::H5 => "##### ",
                    HeadingLevel::H6 => "###### ",
                };
                if !prefix.is_empty() {
                    context
                        .current_line
                        .push(Span::styled(prefix, self.heading_style(level)));
                }
                context.heading = Some((level, String::new()));
            }
            Tag::BlockQuote => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                context.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                let lang = match kind {
                    CodeBlockKind::Fenced(info) if !info.trim().is_empty() => {
                        Some(info.trim().to_string())
                    }
                    _ => None,
                };
                context.code = Some(CodeBlock {
                    lang,
                    text: String::new(),
                });
            }
            Tag::HtmlBlock => {
                self.flush_current_line(context);
                context.html_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_current_line(context);
                if context.list_stack.is_empty() {
                    self.ensure_blank_line(context);
                }
                context.list_stack.push(start);
            }
            Tag::Item => {
                self.flush_current_line(context);
                let depth = context.list_stack.len();
                let marker = match context.list_stack.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{}. ", number);
                        *number += 1;
                        marker
                    }
                    _ if depth % 2 == 0 => "◦ ".to_string(),
                    _ => "• ".to_string(),
                };
                context
                    .current_line
                    .push(Span::styled(marker, self.styles.list_marker));
            }
            Tag::FootnoteDefinition(label) => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                context
                    .current_line
                    .push(Span::styled(format!("[{}]: ", label), self.styles.footnote));
            }
            Tag::Table(_) => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                context.table = Some(TableState::default());
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(table) = context.table.as_mut() {
                    table.current_row.clear();
                }
            }
            Tag::TableCell => {
                if let Some(table) = context.table.as_mut() {
                    table.current_cell.clear();
                }
            }
            Tag::Emphasis => context.style_stack.push(self.styles.emphasis),
            Tag::Strong => context.style_stack.push(self.styles.strong),
            Tag::Strikethrough => context.style_stack.push(self.styles.strikethrough),
            Tag::Link { dest_url, .. } => {
                context.style_stack.push(self.styles.link);
                context.links.push(dest_url.to_string());
            }
            Tag::Image { dest_url, .. } => {
                context
                    .current_line
                    .push(Span::styled("🖼 ", self.styles.image));
                context.style_stack.push(self.styles.image);
                context.links.push(dest_url.to_string());
            }
            Tag::MetadataBlock(_) => {}
        }
    }

    fn handle_end_tag(&self, tag_end: TagEnd, context: &mut RenderContext) -> Result<()> {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_current_line(context);
                if context.list_stack.is_empty() {
                    self.ensure_blank_line(context);
                }
            }
            TagEnd::Heading(level) => self.end_heading(level, context),
            TagEnd::BlockQuote => {
                self.flush_current_line(context);
                context.quote_depth = context.quote_depth.saturating_sub(1);
                self.ensure_blank_line(context);
            }
            TagEnd::CodeBlock => self.end_code_block(context),
            TagEnd::HtmlBlock => {
                if let Some(html) = context.html_block.take() {
                    self.handle_html(&html, true, context);
                }
            }
            TagEnd::List(_) => {
                self.flush_current_line(context);
                context.list_stack.pop();
                if context.list_stack.is_empty() {
                    self.ensure_blank_line(context);
                }
            }
            TagEnd::Item | TagEnd::FootnoteDefinition => self.flush_current_line(context),
            TagEnd::Table => {
                if let Some(table) = context.table.take() {
                    for line in render_table(&table.headers, &table.rows, &self.styles) {
                        self.push_line(line.spans, context);
                    }
                }
                self.ensure_blank_line(context);
            }
            TagEnd::TableHead => {
                if let Some(table) = context.table.as_mut() {
                    table.headers = std::mem::take(&mut table.current_row);
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = context.table.as_mut() {
                    let row = std::mem::take(&mut table.current_row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = context.table.as_mut() {
                    let cell = std::mem::take(&mut table.current_cell);
                    table.current_row.push(cell.trim().to_string());
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                context.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                context.style_stack.pop();
                if let Some(url) = context.links.pop() {
                    if !url.is_empty() && !url.starts_with('#') {
                        let suffix = format!(" ({})", url);
                        match context.table.as_mut() {
                            Some(table) => table.current_cell.push_str(&suffix),
                            None => context
                                .current_line
                                .push(Span::styled(suffix, self.styles.link_url)),
                        }
                    }
                }
            }
            TagEnd::MetadataBlock(_) => {}
        }
        Ok(())
    }

    fn handle_text(&self, text: CowStr<'_>, context: &mut RenderContext) {
        if let Some(code) = context.code.as_mut() {
            code.text.push_str(&text);
            return;
        }
        self.push_text(text.into_string(), context);
    }

    /// Inline code is styled but never highlighted
    fn handle_inline_code(&self, code: CowStr<'_>, context: &mut RenderContext) {
        if let Some(table) = context.table.as_mut() {
            table.current_cell.push_str(&code);
            return;
        }
        if let Some((_, heading)) = context.heading.as_mut() {
            heading.push_str(&code);
        }
        let style = self.current_style(context).patch(self.styles.inline_code);
        context
            .current_line
            .push(Span::styled(format!(" {} ", code), style));
    }

    fn push_text(&self, text: String, context: &mut RenderContext) {
        if let Some(table) = context.table.as_mut() {
            table.current_cell.push_str(&text);
            return;
        }
        if let Some((_, heading)) = context.heading.as_mut() {
            heading.push_str(&text);
        }
        let style = self.current_style(context);
        context.current_line.push(Span::styled(text, style));
    }

    fn handle_html(&self, html: &str, block: bool, context: &mut RenderContext) {
        for token in self.tags.tokenize(html) {
            match token {
                HtmlToken::Open {
                    name,
                    attrs,
                    self_closing,
                } => self.open_component(&name, &attrs, self_closing, context),
                HtmlToken::Close { name } => self.close_component(&name, context),
                HtmlToken::Text(text) => {
                    let text = if block {
                        text.split_whitespace().collect::<Vec<_>>().join(" ")
                    } else {
                        text
                    };
                    if !text.is_empty() {
                        self.push_text(text, context);
                    }
                }
            }
        }

        if block {
            self.flush_current_line(context);
        }
    }

    fn open_component(
        &self,
        name: &str,
        attrs: &BTreeMap<String, String>,
        self_closing: bool,
        context: &mut RenderContext,
    ) {
        let Some(kind) = component_kind(name) else {
            return;
        };

        match kind {
            ComponentKind::Example(example) => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                for line in render_example(example, &self.stack, &self.styles) {
                    self.push_line(line.spans, context);
                }
                self.ensure_blank_line(context);
            }
            ComponentKind::PropsTable => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                let data = attrs.get("data").map(String::as_str).unwrap_or("[]");
                match render_props_table(data, &self.styles) {
                    Ok(lines) => {
                        for line in lines {
                            self.push_line(line.spans, context);
                        }
                    }
                    Err(e) => {
                        warn!("Skipping PropsTable: {:#}", e);
                        self.push_line(
                            vec![Span::styled(format!("PropsTable: {:#}", e), self.styles.caption)],
                            context,
                        );
                    }
                }
                self.ensure_blank_line(context);
            }
            ComponentKind::Container => {
                self.flush_current_line(context);
                self.ensure_blank_line(context);
                let title = attrs.get("title").filter(|t| !t.is_empty());
                let available = context.width.saturating_sub(self.prefix_width(context));
                let head = match title {
                    Some(title) => format!("╭─ {} ", title),
                    None => "╭".to_string(),
                };
                let fill = available.saturating_sub(head.width() + 1);
                let mut spans = vec![Span::styled("╭", self.styles.frame)];
                if let Some(title) = title {
                    spans.push(Span::styled("─ ", self.styles.frame));
                    spans.push(Span::styled(title.clone(), self.styles.frame_title));
                    spans.push(Span::styled(" ", self.styles.frame));
                }
                spans.push(Span::styled(format!("{}╮", "─".repeat(fill)), self.styles.frame));
                self.push_line(spans, context);
                context.frame_depth += 1;

                if self_closing {
                    self.close_component(name, context);
                }
            }
            ComponentKind::Caption => {
                self.flush_current_line(context);
                context.caption = true;
            }
            ComponentKind::InlineCode => {
                if !self_closing {
                    context.style_stack.push(self.styles.inline_code);
                }
            }
        }
    }

    fn close_component(&self, name: &str, context: &mut RenderContext) {
        match component_kind(name) {
            Some(ComponentKind::Container) if context.frame_depth > 0 => {
                self.flush_current_line(context);
                if context.last_blank {
                    context.lines.pop();
                }
                context.frame_depth -= 1;
                let available = context.width.saturating_sub(self.prefix_width(context));
                let line = format!("╰{}╯", "─".repeat(available.saturating_sub(2)));
                self.push_line(vec![Span::styled(line, self.styles.frame)], context);
                self.ensure_blank_line(context);
            }
            Some(ComponentKind::Caption) => {
                self.flush_current_line(context);
                context.caption = false;
            }
            Some(ComponentKind::InlineCode) => {
                context.style_stack.pop();
            }
            _ => {}
        }
    }

    fn end_heading(&self, level: HeadingLevel, context: &mut RenderContext) {
        let text = context
            .heading
            .take()
            .map(|(_, text)| text.trim().to_string())
            .unwrap_or_default();
        let slug = context.slugger.slug(&text);

        context.headings.push(Heading {
            level: level as u8,
            text: text.clone(),
            slug,
            line: context.lines.len(),
        });
        self.flush_current_line(context);

        if level == HeadingLevel::H1 {
            let underline = "═".repeat(text.width().max(1));
            self.push_line(vec![Span::styled(underline, self.styles.heading_1)], context);
        }
        self.ensure_blank_line(context);
    }

    fn end_code_block(&self, context: &mut RenderContext) {
        let Some(block) = context.code.take() else {
            return;
        };
        let code = block.text.trim_end_matches('\n');
        let label = block
            .lang
            .clone()
            .unwrap_or_else(|| self.highlighter.config().default_lang.clone());

        let lines = match self.highlighter.highlight(code, block.lang.as_deref()) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Highlighting failed, showing plain code: {:#}", e);
                code.lines()
                    .map(|line| Line::from(Span::styled(line.to_string(), self.styles.text)))
                    .collect()
            }
        };

        self.push_line(
            vec![
                Span::styled("┌─ ", self.styles.code_border),
                Span::styled(label, self.styles.code_language),
            ],
            context,
        );
        for line in lines {
            let mut spans = vec![Span::styled("│ ", self.styles.code_border)];
            spans.extend(line.spans);
            self.push_line(spans, context);
        }
        self.push_line(vec![Span::styled("└─", self.styles.code_border)], context);
        self.ensure_blank_line(context);
    }

    fn handle_rule(&self, context: &mut RenderContext) {
        self.flush_current_line(context);
        self.ensure_blank_line(context);
        let width = context.width.saturating_sub(self.prefix_width(context));
        self.push_line(vec![Span::styled("─".repeat(width), self.styles.rule)], context);
        self.ensure_blank_line(context);
    }

    fn heading_style(&self, level: HeadingLevel) -> Style {
        match level {
            HeadingLevel::H1 => self.styles.heading_1,
            HeadingLevel::H2 => self.styles.heading_2,
            HeadingLevel::H3 => self.styles.heading_3,
            _ => self.styles.heading_minor,
        }
    }

    fn current_style(&self, context: &RenderContext) -> Style {
        let base = if let Some((level, _)) = &context.heading {
            self.heading_style(*level)
        } else if context.caption {
            self.styles.caption
        } else if context.quote_depth > 0 {
            self.styles.quote_text
        } else {
            self.styles.text
        };
        context
            .style_stack
            .iter()
            .fold(base, |style, patch| style.patch(*patch))
    }

    fn prefix(&self, context: &RenderContext) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        for _ in 0..context.frame_depth {
            spans.push(Span::styled("│ ", self.styles.frame));
        }
        for _ in 0..context.quote_depth {
            spans.push(Span::styled("│ ", self.styles.quote_marker));
        }
        let list_indent = context.list_stack.len().saturating_sub(1);
        if list_indent > 0 {
            spans.push(Span::raw("  ".repeat(list_indent)));
        }
        spans
    }

    fn prefix_width(&self, context: &RenderContext) -> usize {
        self.prefix(context).iter().map(|s| s.width()).sum()
    }

    fn push_line(&self, spans: Vec<Span<'static>>, context: &mut RenderContext) {
        let mut line = self.prefix(context);
        line.extend(spans);
        context.lines.push(Line::from(line));
        context.last_blank = false;
    }

    fn flush_current_line(&self, context: &mut RenderContext) {
        if context.current_line.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut context.current_line);
        self.push_line(spans, context);
    }

    fn ensure_blank_line(&self, context: &mut RenderContext) {
        if context.lines.is_empty() || context.last_blank {
            return;
        }
        // keep frame and quote rules continuous across blank lines
        let mut prefix = self.prefix(context);
        if let Some(last) = prefix.last_mut() {
            let trimmed = last.content.trim_end().to_string();
            last.content = trimmed.into();
        }
        context.lines.push(Line::from(prefix));
        context.last_blank = true;
    }
}

impl std::fmt::Debug for DocsRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsRenderer")
            .field("highlighter", &self.highlighter)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}
