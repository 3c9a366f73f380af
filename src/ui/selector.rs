//! # Command Selector
//!
//! A restartable two-stage form:
//!
//! 1. pick a [`CommandKind`] from the fixed menu
//! 2. pick an option whose list depends on that kind
//!
//! Stage-two title and options are computed from the current kind every time
//! they are read. File options come from a captured `find` in the jail,
//! fetched when stage two opens; a failed fetch is forwarded to the model as a
//! command failure through the selector's [`EventSink`].

use crate::sandbox::{CommandKind, CommandResult, Jail, SelectedCommand};
use crate::ui::event::{Effect, EventSink, Message, Reply};
use crate::ui::keys::{self, Binding};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Tallest the selector is ever allotted, borders included.
pub const MAX_HEIGHT: u16 = 10;
/// Border plus one option row plus the help line.
pub const MIN_HEIGHT: u16 = 4;

pub const SHELL_OPTION: &str = "posix shell";
pub const THEME_OPTION: &str = "not implemented";

const BINDINGS: [Binding; 3] = [
    Binding {
        keys: "↑/↓",
        action: "move",
    },
    Binding {
        keys: "enter",
        action: "select",
    },
    Binding {
        keys: "esc",
        action: "back",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PickKind,
    PickOption,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FileListing {
    NotLoaded,
    Loading,
    Loaded(Vec<String>),
}

pub struct CommandSelector {
    jail: Jail,
    events: EventSink,
    stage: Stage,
    kind_index: usize,
    option_index: usize,
    files: FileListing,
    busy: bool,
    focused: bool,
    width: u16,
    height: u16,
}

/// Split `find` output into trimmed, non-empty lines.
pub fn parse_file_list(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl CommandSelector {
    pub fn new(jail: Jail, events: EventSink) -> Self {
        Self {
            jail,
            events,
            stage: Stage::PickKind,
            kind_index: 0,
            option_index: 0,
            files: FileListing::NotLoaded,
            busy: false,
            focused: true,
            width: 0,
            height: MAX_HEIGHT,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> CommandKind {
        CommandKind::MENU[self.kind_index]
    }

    pub fn title(&self) -> &'static str {
        match self.stage {
            Stage::PickKind => "Choose an action",
            Stage::PickOption => match self.kind() {
                CommandKind::ListFiles => "Here are all your files",
                CommandKind::OpenFile => "Pick a file to open",
                CommandKind::OpenShell => "Pick a shell",
                CommandKind::ChangeTheme => "Pick a new theme",
            },
        }
    }

    /// Stage-two options for the current kind.
    pub fn options(&self) -> Vec<String> {
        match self.kind() {
            CommandKind::ListFiles | CommandKind::OpenFile => match &self.files {
                FileListing::Loaded(files) => files.clone(),
                FileListing::NotLoaded | FileListing::Loading => Vec::new(),
            },
            CommandKind::OpenShell => vec![SHELL_OPTION.to_string()],
            CommandKind::ChangeTheme => vec![THEME_OPTION.to_string()],
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.files == FileListing::Loading
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Allotted width and height, borders included.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height.min(MAX_HEIGHT);
    }

    fn reset(&mut self) {
        self.stage = Stage::PickKind;
        self.kind_index = 0;
        self.option_index = 0;
        self.files = FileListing::NotLoaded;
    }

    fn cursor_len(&self) -> usize {
        match self.stage {
            Stage::PickKind => CommandKind::MENU.len(),
            Stage::PickOption => self.options().len(),
        }
    }

    fn cursor_mut(&mut self) -> &mut usize {
        match self.stage {
            Stage::PickKind => &mut self.kind_index,
            Stage::PickOption => &mut self.option_index,
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.cursor_len();
        if len == 0 {
            return;
        }
        let cursor = self.cursor_mut();
        *cursor = cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn confirm(&mut self) -> Vec<Effect> {
        match self.stage {
            Stage::PickKind => self.open_stage_two(),
            Stage::PickOption => {
                let Some(argument) = self.options().get(self.option_index).cloned() else {
                    return Vec::new();
                };
                let selected = SelectedCommand::new(self.kind(), argument);
                tracing::debug!(?selected, "selection complete");
                self.reset();
                vec![Effect::Emit(Message::Selected(selected))]
            }
        }
    }

    fn open_stage_two(&mut self) -> Vec<Effect> {
        if self.busy || self.is_fetching() {
            return vec![Effect::Emit(Message::Status(
                "a command is still running, wait for it to finish".to_string(),
            ))];
        }

        self.stage = Stage::PickOption;
        self.option_index = 0;

        if !self.kind().needs_file_list() {
            return Vec::new();
        }

        self.files = FileListing::Loading;
        vec![Effect::Capture {
            argv: self.jail.list_files(),
            origin: SelectedCommand::new(CommandKind::ListFiles, self.jail.files_dir.clone()),
            reply: Reply::FileList,
        }]
    }

    /// Route a key press while the selector has focus.
    pub fn update(&mut self, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Home => *self.cursor_mut() = 0,
            KeyCode::End => {
                let last = self.cursor_len().saturating_sub(1);
                *self.cursor_mut() = last;
            }
            KeyCode::Enter => return self.confirm(),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Left => {
                if self.stage == Stage::PickOption {
                    self.stage = Stage::PickKind;
                    self.option_index = 0;
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Take the file listing fetched for stage two.
    pub fn on_files_listed(&mut self, result: CommandResult) {
        match result {
            CommandResult::Success { bytes, .. } => {
                let files = parse_file_list(&bytes);
                tracing::debug!(count = files.len(), "file list loaded");
                self.files = FileListing::Loaded(files);
            }
            failure @ CommandResult::Failure { .. } => {
                self.files = FileListing::Loaded(Vec::new());
                self.events.post(Message::Finished(failure));
            }
        }
        self.option_index = 0;
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let border_color = if self.focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(u16::from(self.focused)),
            ])
            .split(inner);

        let (labels, selected): (Vec<String>, usize) = match self.stage {
            Stage::PickKind => (
                CommandKind::MENU.iter().map(|k| k.label().to_string()).collect(),
                self.kind_index,
            ),
            Stage::PickOption => (self.options(), self.option_index),
        };

        if labels.is_empty() {
            let note = if self.is_fetching() {
                "loading files…"
            } else {
                "nothing here"
            };
            frame.render_widget(
                Paragraph::new(note).style(Style::default().fg(Color::DarkGray)),
                chunks[0],
            );
        } else {
            let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
            let list = List::new(items)
                .highlight_symbol("> ")
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );
            let mut state = ListState::default().with_selected(Some(selected));
            frame.render_stateful_widget(list, chunks[0], &mut state);
        }

        if self.focused {
            frame.render_widget(Paragraph::new(keys::help_line(&BINDINGS)), chunks[1]);
        }
    }
}
