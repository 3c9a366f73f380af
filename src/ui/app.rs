use crate::config::Config;
use crate::sandbox::{CommandKind, CommandResult, ExecutionMode, Jail, SelectedCommand};
use crate::ui::event::{Effect, EventSink, Message, Reply};
use crate::ui::keys;
use crate::ui::selector::{self, CommandSelector};
use crate::ui::status_bar::{Deadline, StatusBar, TICK_PERIOD};
use crate::ui::viewer::ContentView;
use crossterm::event::KeyEvent;
use std::time::Instant;

pub const MAX_WIDTH: u16 = 200;
pub const MAX_HEIGHT: u16 = 100;
pub const MIN_WIDTH: u16 = 20;
/// Outer border plus the smallest selector, viewer and status bar.
pub const MIN_HEIGHT: u16 = 21;
/// Rows and columns taken by the outer double border.
pub const FRAME: u16 = 2;
pub const VIEWER_MIN_HEIGHT: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Selector,
    Viewer,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Selector => Focus::Viewer,
            Focus::Viewer => Focus::Selector,
        }
    }
}

/// Heights handed to each widget, top to bottom, plus the shared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allotment {
    pub width: u16,
    pub selector: u16,
    pub viewer: u16,
    pub status: u16,
}

impl Allotment {
    pub fn total_height(&self) -> u16 {
        self.selector + self.viewer + self.status
    }
}

pub struct Model {
    jail: Jail,
    pub selector: CommandSelector,
    pub viewer: ContentView,
    pub status: StatusBar,
    focus: Focus,
    width: u16,
    height: u16,
    allotment: Allotment,
    in_flight: Option<SelectedCommand>,
    pub should_quit: bool,
}

impl Model {
    pub fn new(config: &Config, events: EventSink) -> Self {
        let deadline = Deadline::after(config.session_length());
        let mut model = Self {
            jail: config.jail.clone(),
            selector: CommandSelector::new(config.jail.clone(), events),
            viewer: ContentView::new(),
            status: StatusBar::new(deadline),
            focus: Focus::Selector,
            width: MIN_WIDTH,
            height: MIN_HEIGHT,
            allotment: Allotment::default(),
            in_flight: None,
            should_quit: false,
        };
        model.apply_focus();
        model.relayout();
        model
    }

    /// Effects to run once before the first message.
    pub fn init(&self) -> Vec<Effect> {
        vec![Effect::StartTicker(TICK_PERIOD)]
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Clamped terminal size.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn allotment(&self) -> Allotment {
        self.allotment
    }

    pub fn in_flight(&self) -> Option<&SelectedCommand> {
        self.in_flight.as_ref()
    }

    pub fn update(&mut self, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Key(key) => self.handle_input(key),
            Message::Resize { width, height } => {
                self.handle_resize(width, height);
                Vec::new()
            }
            Message::Tick => {
                self.handle_tick(Instant::now());
                Vec::new()
            }
            Message::Selected(cmd) => self.handle_selected(cmd),
            Message::FilesListed(result) => {
                self.selector.on_files_listed(result);
                Vec::new()
            }
            Message::Finished(result) => {
                self.handle_command_result(result);
                Vec::new()
            }
            Message::Status(text) => {
                self.set_status(text);
                Vec::new()
            }
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> Vec<Effect> {
        if keys::is_quit(&key) {
            self.should_quit = true;
            return vec![Effect::Quit];
        }
        if keys::is_next_widget(&key) {
            self.set_focus(self.focus.next());
            return Vec::new();
        }

        match self.focus {
            Focus::Selector => self.selector.update(key),
            Focus::Viewer => self.viewer.update(key),
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.width = width.clamp(MIN_WIDTH, MAX_WIDTH);
        self.height = height.clamp(MIN_HEIGHT, MAX_HEIGHT);
        self.relayout();
    }

    /// Advance the clock. The label can shrink, which may free a message row.
    pub fn handle_tick(&mut self, now: Instant) {
        self.status.on_tick(now);
        if self.status.height() != self.allotment.status {
            self.relayout();
        }
    }

    pub fn handle_selected(&mut self, cmd: SelectedCommand) -> Vec<Effect> {
        if cmd.kind == CommandKind::ListFiles {
            tracing::debug!(file = %cmd.argument, "listing entry picked, nothing to run");
            return Vec::new();
        }

        if let Some(running) = &self.in_flight {
            self.set_status(format!("still running {}, try again later", running.kind));
            return Vec::new();
        }

        self.set_focus(Focus::Viewer);

        let argv = match self.jail.argv_for(&cmd) {
            Ok(argv) => argv,
            Err(e) => {
                tracing::warn!(?cmd, error = %e, "cannot build command");
                return vec![Effect::Emit(Message::Finished(CommandResult::failure(e)))];
            }
        };

        tracing::info!(kind = %cmd.kind, argument = %cmd.argument, "dispatching command");
        self.set_status(format!("running {}: {}", cmd.kind, cmd.argument));
        self.in_flight = Some(cmd.clone());
        self.selector.set_busy(true);

        match ExecutionMode::for_kind(cmd.kind) {
            ExecutionMode::Captured => vec![Effect::Capture {
                argv,
                origin: cmd,
                reply: Reply::Finished,
            }],
            ExecutionMode::Interactive => vec![Effect::Interactive { argv, origin: cmd }],
        }
    }

    pub fn handle_command_result(&mut self, result: CommandResult) {
        self.in_flight = None;
        self.selector.set_busy(false);

        match result {
            CommandResult::Success { bytes, origin } => {
                tracing::info!(kind = %origin.kind, bytes = bytes.len(), "command finished");
                self.viewer.set_content(bytes, &origin.argument);
                self.set_status(format!("command finished: {} {}", origin.kind, origin.argument));
            }
            CommandResult::Failure { stderr, error } => {
                tracing::warn!(error = %error, "command failed");
                self.viewer.set_content(stderr, "stderr");
                self.set_status(format!("command failed: {error}"));
            }
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status.set_message(text);
        // message height may have changed
        self.relayout();
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        self.selector.set_focused(self.focus == Focus::Selector);
        self.viewer.set_focused(self.focus == Focus::Viewer);
    }

    fn relayout(&mut self) {
        let width = self.width.saturating_sub(FRAME);
        let inner = self.height.saturating_sub(FRAME);

        self.status.set_width(width);
        let status = self.status.height();
        let selector = inner
            .saturating_sub(status + VIEWER_MIN_HEIGHT)
            .clamp(selector::MIN_HEIGHT, selector::MAX_HEIGHT);
        let viewer = inner.saturating_sub(status + selector);

        self.allotment = Allotment {
            width,
            selector,
            viewer,
            status,
        };
        self.selector.set_size(width, selector);
        self.viewer.set_size(width, viewer);
    }
}
