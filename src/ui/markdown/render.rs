use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use super::table::TableRenderer;
use super::wrap::{spans_width, wrap_spans};
use crate::api::{Message, Role};
use crate::ui::theme::Theme;
use crate::utils::syntax::highlight_code_block;
use crate::utils::time::clock_time;

/// Content never wraps narrower than this, however deep the nesting.
const MIN_CONTENT_WIDTH: usize = 12;

/// Options shared by every message of a transcript render.
#[derive(Clone, Copy, Debug)]
pub struct MessageRenderConfig {
    pub markdown: bool,
    pub syntax_highlighting: bool,
    pub width: usize,
}

impl MessageRenderConfig {
    pub fn new(markdown: bool, syntax_highlighting: bool, width: usize) -> Self {
        Self {
            markdown,
            syntax_highlighting: markdown && syntax_highlighting,
            width,
        }
    }
}

/// Render a whole transcript, one blank line between messages.
pub fn render_transcript(
    messages: &[Message],
    theme: &Theme,
    config: MessageRenderConfig,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (idx, message) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.extend(render_message(message, theme, config));
    }
    lines
}

/// A role label line (with the send time when it parses) followed by the body.
pub fn render_message(msg: &Message, theme: &Theme, config: MessageRenderConfig) -> Vec<Line<'static>> {
    let (label, label_style, text_style) = match msg.role {
        Role::User => ("You", theme.user_prefix_style, theme.user_text_style),
        Role::Assistant => (
            "Assistant",
            theme.assistant_prefix_style,
            theme.assistant_text_style,
        ),
    };

    let mut header = vec![Span::styled(label, label_style)];
    if let Some(time) = clock_time(&msg.created_at) {
        header.push(Span::styled(format!(" · {time}"), theme.timestamp_style));
    }

    let mut lines = vec![Line::from(header)];
    if config.markdown {
        lines.extend(
            MarkdownRenderer::new(&msg.content, theme, text_style, config).render(),
        );
    } else {
        lines.extend(render_plain(&msg.content, text_style, config.width));
    }
    lines
}

fn render_plain(content: &str, style: Style, width: usize) -> Vec<Line<'static>> {
    content
        .lines()
        .flat_map(|raw| wrap_spans(&[Span::styled(raw.to_string(), style)], width))
        .map(Line::from)
        .collect()
}

#[derive(Clone, Copy, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

pub(super) struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    config: MessageRenderConfig,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    /// Marker width of every open list item, outermost first.
    item_indents: Vec<usize>,
    pending_marker: Option<String>,
    quote_depth: usize,
    code_block: Option<(String, String)>,
    table: Option<TableRenderer>,
    /// Link targets and where their text starts in `current_spans`.
    links: Vec<(String, usize)>,
}

impl<'a> MarkdownRenderer<'a> {
    pub(super) fn new(
        content: &'a str,
        theme: &'a Theme,
        base_style: Style,
        config: MessageRenderConfig,
    ) -> Self {
        Self {
            content,
            theme,
            config,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![base_style],
            list_stack: Vec::new(),
            item_indents: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            code_block: None,
            table: None,
            links: Vec::new(),
        }
    }

    pub(super) fn render(mut self) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(self.content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => {
                    if let Some((_, code)) = self.code_block.as_mut() {
                        code.push_str(&text);
                    } else {
                        self.push_text(text.to_string());
                    }
                }
                Event::Code(code) => {
                    self.push_span(Span::styled(code.to_string(), self.theme.md_code_style));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    self.push_text(html.trim_end_matches('\n').to_string());
                }
                Event::SoftBreak => self.push_text(" ".to_string()),
                Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    let width = self.content_width();
                    self.lines.push(Line::from(Span::styled(
                        "─".repeat(width),
                        self.theme.md_rule_style,
                    )));
                    self.push_blank();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.push_span(Span::styled(marker, self.theme.md_list_marker_style));
                }
                _ => {}
            }
        }

        self.flush_line();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.style_stack.push(self.theme.heading_style(heading_depth(level)));
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.style_stack.push(self.theme.md_quote_style);
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => {
                self.flush_line();
                let marker = match self.list_stack.last_mut() {
                    Some(ListKind::Ordered(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.item_indents.push(marker.width());
                self.pending_marker = Some(marker);
            }
            Tag::CodeBlock(kind) => {
                self.flush_line();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        info.split_whitespace().next().unwrap_or_default().to_string()
                    }
                    CodeBlockKind::Indented => String::new(),
                };
                self.code_block = Some((lang, String::new()));
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.links
                    .push((dest_url.to_string(), self.current_spans.len()));
            }
            Tag::Table(_) => {
                self.flush_line();
                self.table = Some(TableRenderer::new());
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.start_header();
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.style_stack.pop();
                self.push_blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.style_stack.pop();
                if self.quote_depth == 0 {
                    self.push_blank();
                }
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank();
                }
            }
            TagEnd::Item => {
                self.flush_line();
                self.item_indents.pop();
                self.pending_marker = None;
            }
            TagEnd::CodeBlock => {
                if let Some((lang, code)) = self.code_block.take() {
                    self.emit_code_block(&lang, &code);
                }
                self.push_blank();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some((dest, start)) = self.links.pop() {
                    let text: String = self
                        .current_spans
                        .get(start..)
                        .unwrap_or_default()
                        .iter()
                        .map(|s| s.content.as_ref())
                        .collect();
                    if !dest.is_empty() && text != dest {
                        self.push_span(Span::styled(
                            format!(" <{dest}>"),
                            self.theme.timestamp_style,
                        ));
                    }
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.end_header();
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    table.end_row();
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = self.table.as_mut() {
                    table.end_cell();
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    let (prefix, _) = self.line_prefixes();
                    let width = self.content_width();
                    for line in table.render(self.theme, width) {
                        let mut spans = prefix.clone();
                        spans.extend(line.spans);
                        self.lines.push(Line::from(spans));
                    }
                }
                self.push_blank();
            }
            _ => {}
        }
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn current_style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_text(&mut self, text: String) {
        let span = Span::styled(text, self.current_style());
        self.push_span(span);
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.table.as_mut() {
            Some(table) => table.add_span(span),
            None => self.current_spans.push(span),
        }
    }

    /// Prefix for the first wrapped line and for continuation lines.
    fn line_prefixes(&mut self) -> (Vec<Span<'static>>, Vec<Span<'static>>) {
        let mut first = Vec::new();
        for _ in 0..self.quote_depth {
            first.push(Span::styled("│ ", self.theme.md_quote_style));
        }
        let outer_indent: usize = self
            .item_indents
            .iter()
            .take(self.item_indents.len().saturating_sub(1))
            .sum();
        if outer_indent > 0 {
            first.push(Span::raw(" ".repeat(outer_indent)));
        }
        let mut rest = first.clone();
        if let Some(own) = self.item_indents.last() {
            rest.push(Span::raw(" ".repeat(*own)));
            match self.pending_marker.take() {
                Some(marker) => {
                    first.push(Span::styled(marker, self.theme.md_list_marker_style))
                }
                None => first.push(Span::raw(" ".repeat(*own))),
            }
        }
        (first, rest)
    }

    fn content_width(&self) -> usize {
        let prefix = self.quote_depth * 2 + self.item_indents.iter().sum::<usize>();
        self.config
            .width
            .saturating_sub(prefix)
            .max(MIN_CONTENT_WIDTH)
    }

    fn flush_line(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current_spans);
        let (first, rest) = self.line_prefixes();
        let width = self.content_width();
        for (idx, chunk) in wrap_spans(&spans, width).into_iter().enumerate() {
            let mut line = if idx == 0 { first.clone() } else { rest.clone() };
            line.extend(chunk);
            self.lines.push(Line::from(line));
        }
    }

    fn push_blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn emit_code_block(&mut self, lang: &str, code: &str) {
        let code = code.strip_suffix('\n').unwrap_or(code);
        let highlighted = if self.config.syntax_highlighting {
            highlight_code_block(lang, code, self.theme)
        } else {
            None
        };
        let body = highlighted.unwrap_or_else(|| {
            let mut style = self.theme.md_codeblock_text_style;
            if let Some(bg) = self.theme.md_codeblock_bg_color() {
                style = style.bg(bg);
            }
            code.lines()
                .map(|line| Line::from(Span::styled(line.to_string(), style)))
                .collect()
        });

        let (first, rest) = self.line_prefixes();
        let width = self.content_width();
        for (idx, line) in body.into_iter().enumerate() {
            let prefix = if idx == 0 { &first } else { &rest };
            // Code keeps its indentation, so wrap by columns rather than words.
            for chunk in hard_wrap(line.spans, width) {
                let mut spans = prefix.clone();
                spans.extend(chunk);
                self.lines.push(Line::from(spans));
            }
        }
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn hard_wrap(spans: Vec<Span<'static>>, width: usize) -> Vec<Vec<Span<'static>>> {
    if spans_width(&spans) <= width {
        return vec![spans];
    }
    let mut out = vec![Vec::new()];
    let mut used = 0usize;
    for span in spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let ch_width = ch.to_string().width();
            if used + ch_width > width && used > 0 {
                if let (false, Some(line)) = (chunk.is_empty(), out.last_mut()) {
                    line.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                out.push(Vec::new());
                used = 0;
            }
            chunk.push(ch);
            used += ch_width;
        }
        if !chunk.is_empty() {
            if let Some(line) = out.last_mut() {
                line.push(Span::styled(chunk, span.style));
            }
        }
    }
    out
}
