//! # Content Viewer
//!
//! Holds the current content buffer and shows it through a renderer picked
//! from the buffer's label.
//!
//! Rendering is lazy: [`ContentView::set_content`] and
//! [`ContentView::set_size`] only mark the view dirty, and the next draw does
//! the work. Setting identical bytes under an identical label is a no-op, so
//! repeated results do not trigger another render pass.

use crate::render::{text_to_string, ContentType, Renderer};
use crate::ui::event::Effect;
use crate::ui::keys::{self, Binding};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Text,
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Shown whenever there is nothing else to show.
pub const FALLBACK_DOCUMENT: &str = include_str!("../../assets/intro.md");
pub const FALLBACK_LABEL: &str = "hello.md";

/// Border rows plus the footer row.
const CHROME_ROWS: u16 = 3;
const CHROME_COLS: u16 = 2;

const BINDINGS: [Binding; 2] = [
    Binding {
        keys: "↑/↓",
        action: "scroll",
    },
    Binding {
        keys: "pgup/pgdn",
        action: "page",
    },
];

/// Raw bytes plus the label they were produced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBuffer {
    pub bytes: Vec<u8>,
    pub label: String,
    pub content_type: ContentType,
}

impl ContentBuffer {
    pub fn new(bytes: Vec<u8>, label: &str) -> Self {
        if bytes.is_empty() {
            return Self::fallback();
        }
        Self {
            content_type: ContentType::from_label(label),
            bytes,
            label: label.to_string(),
        }
    }

    pub fn fallback() -> Self {
        Self {
            bytes: FALLBACK_DOCUMENT.as_bytes().to_vec(),
            label: FALLBACK_LABEL.to_string(),
            content_type: ContentType::Markdown,
        }
    }
}

pub struct ContentView {
    buffer: ContentBuffer,
    renderer: Option<Renderer>,
    rendered: Text<'static>,
    dirty: bool,
    renders: usize,
    scroll: u16,
    width: u16,
    height: u16,
    focused: bool,
}

impl Default for ContentView {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentView {
    pub fn new() -> Self {
        Self {
            buffer: ContentBuffer::fallback(),
            renderer: None,
            rendered: Text::default(),
            dirty: true,
            renders: 0,
            scroll: 0,
            width: 40,
            height: 40,
            focused: false,
        }
    }

    pub fn buffer(&self) -> &ContentBuffer {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many render passes have run so far.
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// Body viewport size, borders and footer excluded.
    pub fn viewport(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Replace the buffer. Empty bytes bring back the fallback document.
    pub fn set_content(&mut self, bytes: Vec<u8>, label: &str) {
        let next = ContentBuffer::new(bytes, label);
        if next == self.buffer {
            return;
        }

        if next.content_type != self.buffer.content_type {
            self.renderer = None;
        }
        self.buffer = next;
        self.scroll = 0;
        self.dirty = true;
    }

    /// Apply a new outer allotment (borders and footer included).
    pub fn set_size(&mut self, width: u16, height: u16) {
        let width = width.saturating_sub(CHROME_COLS);
        let height = height.saturating_sub(CHROME_ROWS);
        if (width, height) == (self.width, self.height) {
            return;
        }

        self.width = width;
        self.height = height;
        // renderers are sized for the old viewport
        self.renderer = None;
        self.dirty = true;
    }

    fn rerender(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let renderer = match self.renderer {
            Some(r) => Ok(r),
            None => Renderer::new(self.buffer.content_type, self.width),
        };

        let result = renderer.and_then(|r| {
            self.renderer = Some(r);
            r.render(&self.buffer.bytes)
        });

        self.rendered = match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(label = %self.buffer.label, error = %e, "render failed");
                Text::raw(format!("failed to render content: {e}"))
            }
        };
        self.renders += 1;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// The rendered content, rendering first if needed.
    pub fn rendered(&mut self) -> &Text<'static> {
        self.rerender();
        &self.rendered
    }

    pub fn render_to_string(&mut self) -> String {
        self.rerender();
        text_to_string(&self.rendered)
    }

    /// Lines inside the viewport at the current scroll offset.
    pub fn visible(&self) -> Text<'static> {
        let start = usize::from(self.scroll).min(self.rendered.lines.len());
        let end = (start + usize::from(self.height)).min(self.rendered.lines.len());
        Text::from(self.rendered.lines[start..end].to_vec())
    }

    fn max_scroll(&self) -> u16 {
        let lines = u16::try_from(self.rendered.lines.len()).unwrap_or(u16::MAX);
        lines.saturating_sub(self.height)
    }

    pub fn scroll_percent(&self) -> u16 {
        let max = self.max_scroll();
        if max == 0 {
            return 100;
        }
        (u32::from(self.scroll) * 100 / u32::from(max)) as u16
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = u16::try_from(next).unwrap_or(0);
    }

    /// Route a key press while the viewer has focus.
    pub fn update(&mut self, key: KeyEvent) -> Vec<Effect> {
        self.rerender();
        let page = i32::from(self.height.max(1));
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = self.max_scroll(),
            _ => {}
        }
        Vec::new()
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect) {
        self.rerender();

        let border_color = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(inner);

        frame.render_widget(Paragraph::new(self.visible()), chunks[0]);

        let scroll = format!(
            "{}    scroll: {:3}%",
            self.buffer.label,
            self.scroll_percent()
        );
        let scroll_width = u16::try_from(scroll.width()).unwrap_or(u16::MAX);
        let footer = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(scroll_width)])
            .split(chunks[1]);

        if self.focused {
            frame.render_widget(Paragraph::new(keys::help_line(&BINDINGS)), footer[0]);
        }
        frame.render_widget(
            Paragraph::new(scroll)
                .alignment(Alignment::Right)
                .style(Style::default().add_modifier(Modifier::ITALIC)),
            footer[1],
        );
    }
}
