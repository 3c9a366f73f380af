//! Session clock and the one-line status message.

use crate::ui::event::{EventSink, Message};
use chrono::{DateTime, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use unicode_width::UnicodeWidthStr;

pub const TICK_PERIOD: Duration = Duration::from_millis(500);
pub const INITIAL_MESSAGE: &str = "no new message";
pub const MAX_MESSAGE_LINES: u16 = 3;

const BORDER_ROWS: u16 = 2;

/// Longest session the clock tracks. Longer requests are cut to this.
pub const MAX_SESSION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Fixed end of the session. Set once when the panel starts.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    wall: DateTime<Local>,
}

impl Deadline {
    pub fn after(length: Duration) -> Self {
        let length = length.min(MAX_SESSION);
        let wall = chrono::Duration::from_std(length)
            .ok()
            .and_then(|d| Local::now().checked_add_signed(d))
            .unwrap_or_else(Local::now);
        let now = Instant::now();
        Self {
            at: now.checked_add(length).unwrap_or(now),
            wall,
        }
    }

    /// Zero once the deadline has passed.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.at.saturating_duration_since(now)
    }
}

/// `MM:SS.mmm`, minutes not wrapped at an hour.
pub fn format_remaining(remaining: Duration) -> String {
    let total_ms = remaining.as_millis();
    let minutes = total_ms / 60_000;
    let seconds = (total_ms / 1_000) % 60;
    let millis = total_ms % 1_000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}

pub struct StatusBar {
    deadline: Deadline,
    remaining: Duration,
    message: String,
    width: u16,
}

impl StatusBar {
    pub fn new(deadline: Deadline) -> Self {
        Self {
            remaining: deadline.remaining(Instant::now()),
            deadline,
            message: INITIAL_MESSAGE.to_string(),
            width: 80,
        }
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.remaining = self.deadline.remaining(now);
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    /// Text on the right-hand side.
    pub fn clock_label(&self) -> String {
        if self.remaining.is_zero() {
            return "deadline passed".to_string();
        }
        format!(
            "Remaining: {} (until {})",
            format_remaining(self.remaining),
            self.deadline.wall.format("%H:%M:%S")
        )
    }

    fn message_width(&self) -> usize {
        let clock = self.clock_label().width() + 1;
        usize::from(self.width.saturating_sub(BORDER_ROWS))
            .saturating_sub(clock)
            .max(1)
    }

    fn wrapped(&self) -> Vec<String> {
        let mut lines: Vec<String> = textwrap::wrap(&self.message, self.message_width())
            .into_iter()
            .map(|line| line.into_owned())
            .collect();
        let max = usize::from(MAX_MESSAGE_LINES);
        if lines.len() > max {
            lines.truncate(max);
            if let Some(last) = lines.last_mut() {
                last.push('…');
            }
        }
        lines
    }

    /// Rows needed at the current width, borders included.
    pub fn height(&self) -> u16 {
        let lines = u16::try_from(self.wrapped().len()).unwrap_or(MAX_MESSAGE_LINES);
        lines.clamp(1, MAX_MESSAGE_LINES) + BORDER_ROWS
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let clock = self.clock_label();
        let clock_width = u16::try_from(clock.width()).unwrap_or(u16::MAX);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(clock_width)])
            .split(inner);

        let message: Text = self.wrapped().into_iter().map(Line::from).collect();
        frame.render_widget(Paragraph::new(message), chunks[0]);

        let clock_color = if self.remaining.is_zero() {
            Color::Red
        } else {
            Color::Yellow
        };
        frame.render_widget(
            Paragraph::new(clock).style(
                Style::default()
                    .fg(clock_color)
                    .add_modifier(Modifier::BOLD),
            ),
            chunks[1],
        );
    }
}

/// Posts [`Message::Tick`] at a fixed period until dropped.
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    pub fn spawn(events: EventSink, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !events.post(Message::Tick) {
                    break;
                }
            }
        });
        Self { handle }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
