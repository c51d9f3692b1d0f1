//! Markdown blocks
//!
//! Two steps: [`compose`] turns a `{title, content}` payload into one
//! markdown source (title heading, de-duplicated body, or a placeholder), and
//! [`render_markdown`] walks the pulldown-cmark event stream into styled
//! ratatui lines.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use serde::Deserialize;

/// Shown when a payload has neither title nor content
pub const NO_CONTENT_PLACEHOLDER: &str = "_No specific content provided for markdown display._";

static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#+\s*").unwrap());

const RULE_WIDTH: usize = 40;

/// Payload of a `markdown` message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MarkdownPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl MarkdownPayload {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    /// Titled "Error" block used by every markdown error path
    pub fn error(content: impl Into<String>) -> Self {
        Self::new("Error", content)
    }
}

/// Lowercased heading text without `#` markers
pub fn normalize_heading(text: &str) -> String {
    HEADING_MARKER
        .replace(text.trim(), "")
        .trim()
        .to_lowercase()
}

/// Build the markdown source for a payload.
///
/// A plain title becomes a level-2 heading; a title that already starts
/// with `#` is kept as written. When the body opens with the same heading,
/// that line and the blank lines after it are dropped.
pub fn compose(payload: &MarkdownPayload) -> String {
    let mut sections: Vec<String> = Vec::new();

    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(title) = title {
        if title.starts_with('#') {
            sections.push(title.to_string());
        } else {
            sections.push(format!("## {}", title));
        }
    }

    let content = payload
        .content
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    match (content, title) {
        (Some(content), Some(title)) => {
            let body = strip_duplicate_title(content, title);
            if !body.trim().is_empty() {
                sections.push(body);
            }
        }
        (Some(content), None) => sections.push(content.to_string()),
        (None, _) => {}
    }

    if sections.is_empty() {
        sections.push(NO_CONTENT_PLACEHOLDER.to_string());
    }

    sections.join("\n\n")
}

fn strip_duplicate_title(content: &str, title: &str) -> String {
    let mut lines = content.lines();
    let first = lines.next().unwrap_or_default();
    if normalize_heading(first) != normalize_heading(title) {
        return content.to_string();
    }

    tracing::debug!(title, "dropped duplicate title line from markdown body");
    lines
        .skip_while(|line| line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Styles applied while rendering
#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    pub text: Style,
    pub heading: Style,
    pub subheading: Style,
    pub code: Style,
    pub quote: Style,
    pub link: Style,
    pub marker: Style,
    pub rule: Style,
}

impl Default for MarkdownStyles {
    fn default() -> Self {
        Self {
            text: Style::default(),
            heading: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            subheading: Style::default().add_modifier(Modifier::BOLD),
            code: Style::default().fg(Color::Yellow),
            quote: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            link: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::UNDERLINED),
            marker: Style::default().fg(Color::Yellow),
            rule: Style::default().fg(Color::DarkGray),
        }
    }
}

/// Render markdown source into owned, styled lines
pub fn render_markdown(source: &str, styles: &MarkdownStyles) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = LineWriter::new(styles);
    for event in Parser::new_ext(source, options) {
        writer.event(event);
    }
    writer.finish()
}

/// Concatenated span text of one line
pub fn line_text(line: &Line<'_>) -> String {
    line.spans.iter().map(|s| s.content.as_ref()).collect()
}

struct LineWriter<'s> {
    styles: &'s MarkdownStyles,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    /// `current` holds only an item marker so far
    marker_only: bool,
    style_stack: Vec<Style>,
    /// One entry per open list: next number for ordered lists
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    heading: Option<HeadingLevel>,
    code_block: bool,
    table_cell: usize,
}

impl<'s> LineWriter<'s> {
    fn new(styles: &'s MarkdownStyles) -> Self {
        Self {
            styles,
            lines: Vec::new(),
            current: Vec::new(),
            marker_only: false,
            style_stack: vec![styles.text],
            lists: Vec::new(),
            quote_depth: 0,
            heading: None,
            code_block: false,
            table_cell: 0,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or(self.styles.text)
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.style_stack.push(next);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn text(&mut self, text: impl Into<String>) {
        let style = self.style();
        self.current.push(Span::styled(text.into(), style));
        self.marker_only = false;
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        if self.quote_depth > 0 {
            spans.push(Span::styled("│ ".repeat(self.quote_depth), self.styles.quote));
        }
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
        self.marker_only = false;
    }

    /// Separate top-level blocks with one blank line
    fn start_block(&mut self) {
        if self.marker_only {
            return;
        }
        self.flush_line();
        if !self.lists.is_empty() {
            return;
        }
        if self.lines.last().is_some_and(|l| !line_text(l).is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.code_block => {
                for line in text.trim_end_matches('\n').split('\n') {
                    self.current
                        .push(Span::styled(format!("    {}", line), self.styles.code));
                    self.flush_line();
                }
            }
            Event::Text(text) => self.text(text.to_string()),
            Event::Code(code) => {
                let style = self.style().patch(self.styles.code);
                self.current.push(Span::styled(code.to_string(), style));
                self.marker_only = false;
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.text(html.trim_end_matches('\n').to_string())
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.start_block();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    self.styles.rule,
                )));
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.start_block(),
            Tag::Heading { level, .. } => {
                self.start_block();
                self.heading = Some(level);
                let style = match level {
                    HeadingLevel::H1 | HeadingLevel::H2 => self.styles.heading,
                    _ => self.styles.subheading,
                };
                self.push_style(style);
            }
            Tag::BlockQuote { .. } => {
                self.start_block();
                self.quote_depth += 1;
                self.push_style(self.styles.quote);
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                self.code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.current
                            .push(Span::styled(format!("  {}", lang), self.styles.rule));
                        self.flush_line();
                    }
                }
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                } else {
                    self.flush_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current.push(Span::styled(
                    format!("{}{}", "  ".repeat(depth), marker),
                    self.styles.marker,
                ));
                self.marker_only = true;
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { .. } => self.push_style(self.styles.link),
            Tag::Table(_) => self.start_block(),
            Tag::TableHead | Tag::TableRow => {
                self.flush_line();
                self.table_cell = 0;
            }
            Tag::TableCell => {
                if self.table_cell > 0 {
                    self.current.push(Span::styled(" │ ", self.styles.rule));
                }
                self.table_cell += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.flush_line(),
            TagEnd::Heading(_) => {
                let level = self.heading.take();
                let width = self
                    .current
                    .iter()
                    .map(|s| s.content.chars().count())
                    .sum::<usize>();
                self.flush_line();
                self.pop_style();
                let underline = match level {
                    Some(HeadingLevel::H1) => Some("═"),
                    Some(HeadingLevel::H2) => Some("─"),
                    _ => None,
                };
                if let Some(ch) = underline {
                    self.lines.push(Line::from(Span::styled(
                        ch.repeat(width.max(1)),
                        self.styles.rule,
                    )));
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.pop_style();
            }
            TagEnd::CodeBlock => {
                self.flush_line();
                self.code_block = false;
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.lists.pop();
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style()
            }
            TagEnd::TableHead => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(RULE_WIDTH),
                    self.styles.rule,
                )));
            }
            TagEnd::TableRow | TagEnd::Table => self.flush_line(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|l| line_text(l).is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain(source: &str) -> Vec<String> {
        render_markdown(source, &MarkdownStyles::default())
            .iter()
            .map(line_text)
            .collect()
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading("## Quarterly Report "), "quarterly report");
        assert_eq!(normalize_heading("Quarterly REPORT"), "quarterly report");
        assert_eq!(normalize_heading("#Report"), "report");
    }

    #[test]
    fn test_plain_title_becomes_h2() {
        let source = compose(&MarkdownPayload {
            title: Some("Report".into()),
            content: None,
        });
        assert_eq!(source, "## Report");
    }

    #[test]
    fn test_heading_title_kept_as_is() {
        let source = compose(&MarkdownPayload {
            title: Some("# Report".into()),
            content: Some("Body".into()),
        });
        assert_eq!(source, "# Report\n\nBody");
    }

    #[test]
    fn test_duplicate_first_line_dropped() {
        let source = compose(&MarkdownPayload::new("Report", "## report\n\n\nBody text."));
        assert_eq!(source, "## Report\n\nBody text.");
    }

    #[test]
    fn test_non_duplicate_first_line_kept() {
        let source = compose(&MarkdownPayload::new("Report", "Summary\nBody"));
        assert_eq!(source, "## Report\n\nSummary\nBody");
    }

    #[test]
    fn test_only_duplicate_line_leaves_title() {
        let source = compose(&MarkdownPayload::new("Report", "# Report"));
        assert_eq!(source, "## Report");
    }

    #[test]
    fn test_placeholder_when_empty() {
        assert_eq!(compose(&MarkdownPayload::default()), NO_CONTENT_PLACEHOLDER);
        let blank = MarkdownPayload::new("   ", "\n  \n");
        assert_eq!(compose(&blank), NO_CONTENT_PLACEHOLDER);
    }

    #[test]
    fn test_blocks_are_separated() {
        assert_eq!(
            plain("## Report\n\nBody text."),
            vec!["Report", "──────", "", "Body text."]
        );
    }

    #[test]
    fn test_lists_and_code() {
        let lines = plain("- one\n- two\n\n1. first\n2. second\n\n```rust\nlet x = 1;\n```");
        assert_eq!(
            lines,
            vec![
                "• one",
                "• two",
                "",
                "1. first",
                "2. second",
                "",
                "  rust",
                "    let x = 1;",
            ]
        );
    }

    #[test]
    fn test_nested_list_indents() {
        let lines = plain("- outer\n  - inner");
        assert_eq!(lines, vec!["• outer", "  • inner"]);
    }

    #[test]
    fn test_quote_and_inline_styles() {
        let lines = plain("> **bold** and `code`");
        assert_eq!(lines, vec!["│ bold and code"]);
    }

    #[test]
    fn test_table_rows() {
        let lines = plain("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(lines[0], "a │ b");
        assert_eq!(lines[2], "1 │ 2");
    }

    #[test]
    fn test_placeholder_renders_as_italic_text() {
        let lines = render_markdown(NO_CONTENT_PLACEHOLDER, &MarkdownStyles::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(Modifier::ITALIC));
    }
}
