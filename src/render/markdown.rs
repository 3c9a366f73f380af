//! Markdown to styled, word-wrapped terminal text.
//!
//! Walks the `pulldown-cmark` event stream once and lays words out greedily
//! against the viewport width. Code blocks are never wrapped.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const BULLET: &str = "• ";
const QUOTE_BAR: &str = "│ ";

/// Render markdown `source` wrapped to `width` columns.
pub fn render(source: &str, width: usize) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = Writer::new(width);
    for event in Parser::new_ext(source, options) {
        writer.handle(event);
    }
    writer.finish()
}

/// Per-nesting-level line prefix. `first` is used once, then `rest`.
struct Prefix {
    first: Option<String>,
    rest: String,
}

struct Writer {
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    current_width: usize,
    pending_space: bool,
    styles: Vec<Style>,
    prefixes: Vec<Prefix>,
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    code_block: bool,
}

impl Writer {
    fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            lines: Vec::new(),
            current: Vec::new(),
            current_width: 0,
            pending_space: false,
            styles: vec![Style::default()],
            prefixes: Vec::new(),
            lists: Vec::new(),
            links: Vec::new(),
            code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn prefix_width(&self) -> usize {
        self.prefixes
            .iter()
            .map(|p| p.first.as_deref().unwrap_or(&p.rest).width())
            .sum()
    }

    fn available(&self) -> usize {
        self.width.saturating_sub(self.prefix_width()).max(1)
    }

    fn take_prefix(&mut self) -> Vec<Span<'static>> {
        self.prefixes
            .iter_mut()
            .map(|p| {
                let text = p.first.take().unwrap_or_else(|| p.rest.clone());
                Span::styled(text, Style::default().fg(Color::DarkGray))
            })
            .collect()
    }

    fn flush_line(&mut self) {
        let mut spans = self.take_prefix();
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
        self.current_width = 0;
        self.pending_space = false;
    }

    fn flush_if_pending(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
    }

    fn blank_line(&mut self) {
        self.flush_if_pending();
        let last_blank = self.lines.last().map_or(true, |l| l.width() == 0);
        if !last_blank {
            self.lines.push(Line::default());
        }
    }

    fn push_words(&mut self, text: &str, style: Style) {
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                self.pending_space = true;
            }
            if word.is_empty() {
                continue;
            }

            let word_width = word.width();
            let space = usize::from(self.pending_space && !self.current.is_empty());
            if word_width > self.available() {
                if space == 1 && self.current_width + space < self.available() {
                    self.current.push(Span::raw(" "));
                    self.current_width += 1;
                } else if !self.current.is_empty() {
                    self.flush_line();
                }
                self.pending_space = false;
                self.push_broken_word(word, style);
                continue;
            }
            if !self.current.is_empty()
                && self.current_width + space + word_width > self.available()
            {
                self.flush_line();
            } else if space == 1 {
                self.current.push(Span::raw(" "));
                self.current_width += 1;
            }

            self.pending_space = false;
            self.current.push(Span::styled(word.to_string(), style));
            self.current_width += word_width;
        }
    }

    /// Lay out a word wider than the line, cutting it wherever the line fills.
    fn push_broken_word(&mut self, word: &str, style: Style) {
        let mut chunk = String::new();
        for ch in word.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.current_width > 0 && self.current_width + ch_width > self.available() {
                if !chunk.is_empty() {
                    self.current
                        .push(Span::styled(std::mem::take(&mut chunk), style));
                }
                self.flush_line();
            }
            chunk.push(ch);
            self.current_width += ch_width;
        }
        if !chunk.is_empty() {
            self.current.push(Span::styled(chunk, style));
        }
    }

    fn push_code_lines(&mut self, text: &str) {
        let style = Style::default().fg(Color::Yellow);
        for line in text.lines() {
            self.current.push(Span::raw("  "));
            self.current.push(Span::styled(line.to_string(), style));
            self.flush_line();
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.code_block {
                    self.push_code_lines(&text);
                } else {
                    let style = self.style();
                    self.push_words(&text, style);
                }
            }
            Event::Code(code) => {
                let style = self.style().fg(Color::Yellow).bg(Color::Black);
                self.push_words(&code, style);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let style = Style::default().fg(Color::DarkGray);
                self.push_words(html.trim_end(), style);
            }
            Event::SoftBreak => self.pending_space = true,
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.blank_line();
                let rule = "─".repeat(self.available().min(40));
                self.current
                    .push(Span::styled(rule, Style::default().fg(Color::DarkGray)));
                self.flush_line();
                self.blank_line();
            }
            Event::TaskListMarker(checked) => {
                let mark = if checked { "[x]" } else { "[ ]" };
                self.push_words(mark, Style::default().fg(Color::Green));
                self.pending_space = true;
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.blank_line();
                let style = heading_style(level);
                self.push_style(style);
                let marker = "#".repeat(heading_depth(level));
                self.push_words(&marker, style);
                self.pending_space = true;
            }
            Tag::BlockQuote { .. } => {
                self.blank_line();
                self.prefixes.push(Prefix {
                    first: None,
                    rest: QUOTE_BAR.to_string(),
                });
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.blank_line();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.current.push(Span::styled(
                            format!("  {lang}"),
                            Style::default().fg(Color::DarkGray),
                        ));
                        self.flush_line();
                    }
                }
                self.code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.flush_if_pending();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_if_pending();
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => BULLET.to_string(),
                };
                let rest = " ".repeat(marker.width());
                self.prefixes.push(Prefix {
                    first: Some(marker),
                    rest,
                });
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
            }
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_style(Style::default().fg(Color::Magenta));
                let style = self.style();
                self.push_words("[image:", style);
                self.pending_space = true;
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.blank_line();
                } else {
                    self.flush_if_pending();
                }
            }
            TagEnd::Heading(_) => {
                self.pop_style();
                self.blank_line();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_if_pending();
                self.prefixes.pop();
                self.pop_style();
                self.blank_line();
            }
            TagEnd::CodeBlock => {
                self.code_block = false;
                self.blank_line();
            }
            TagEnd::List(_) => {
                self.flush_if_pending();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank_line();
                }
            }
            TagEnd::Item => {
                self.flush_if_pending();
                self.prefixes.pop();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.links.pop() {
                    if !url.is_empty() && !url.starts_with('#') {
                        self.push_words(
                            &format!(" ({url})"),
                            Style::default().fg(Color::DarkGray),
                        );
                    }
                }
            }
            TagEnd::Image => {
                let style = self.style();
                self.pending_space = false;
                self.push_words("]", style);
                self.pop_style();
                self.links.pop();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush_if_pending();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        Text::from(self.lines)
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

fn heading_style(level: HeadingLevel) -> Style {
    let base = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.fg(Color::Black).bg(Color::Cyan),
        HeadingLevel::H2 => base.fg(Color::Cyan),
        _ => base.fg(Color::LightBlue),
    }
}
