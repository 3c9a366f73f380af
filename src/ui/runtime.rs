//! # Event Loop
//!
//! Single-threaded message loop around the [`Model`]:
//!
//! 1. draw
//! 2. drain posted messages in arrival order
//! 3. poll one terminal event
//! 4. execute the effects each update returned
//!
//! Captured commands and the ticker run as tokio tasks and post back through
//! the [`EventSink`]. Interactive commands are the exception: the loop hands
//! the terminal to the child and blocks until it exits.

use crate::config::Config;
use crate::sandbox::dispatcher::{run_captured, run_interactive};
use crate::sandbox::{CommandResult, DispatchError, SelectedCommand};
use crate::ui::app::Model;
use crate::ui::event::{Effect, EventSink, Message, Reply};
use crate::ui::render;
use crate::ui::status_bar::Ticker;
use anyhow::{anyhow, Context, Result};
use crossterm::{
    cursor, event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// Trait for reading terminal events (allows dependency injection for testing)
pub trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<event::Event>>;
}

/// Production event reader that uses crossterm's event polling + read
pub struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<event::Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(event::read().context("Failed to read terminal event")?))
        } else {
            Ok(None)
        }
    }
}

/// Releases and reclaims the terminal around an interactive child.
pub trait TerminalControl {
    fn suspend(&mut self) -> Result<()>;
    fn resume(&mut self) -> Result<()>;
}

pub struct CrosstermControl;

impl TerminalControl for CrosstermControl {
    fn suspend(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)
            .context("Failed to leave alternate screen")?;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
            .context("Failed to enter alternate screen")?;
        Ok(())
    }
}

pub struct Runtime {
    model: Model,
    events: EventSink,
    inbox: UnboundedReceiver<Message>,
    ticker: Option<Ticker>,
}

impl Runtime {
    pub fn new(config: &Config) -> Self {
        let (events, inbox) = EventSink::channel();
        Self {
            model: Model::new(config, events.clone()),
            events,
            inbox,
            ticker: None,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Run until a quit binding is pressed.
    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        reader: &mut dyn EventReader,
        control: &mut dyn TerminalControl,
    ) -> Result<()> {
        let size = terminal
            .size()
            .map_err(|e| anyhow!("Failed to read terminal size: {e}"))?;
        self.model.handle_resize(size.width, size.height);

        let init = self.model.init();
        self.apply(init, terminal, control)?;

        while !self.model.should_quit {
            let model = &mut self.model;
            terminal
                .draw(|f| render::render(f, model))
                .map_err(|e| anyhow!("Failed to draw terminal UI: {e}"))?;

            while let Ok(msg) = self.inbox.try_recv() {
                let effects = self.model.update(msg);
                self.apply(effects, terminal, control)?;
            }
            if self.model.should_quit {
                break;
            }

            if let Some(msg) = reader.read_event(POLL_TIMEOUT)?.and_then(Message::from_terminal) {
                let effects = self.model.update(msg);
                self.apply(effects, terminal, control)?;
            }

            tokio::task::yield_now().await;
        }

        tracing::info!("event loop finished");
        Ok(())
    }

    fn apply<B: Backend>(
        &mut self,
        effects: Vec<Effect>,
        terminal: &mut Terminal<B>,
        control: &mut dyn TerminalControl,
    ) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Capture {
                    argv,
                    origin,
                    reply,
                } => {
                    let events = self.events.clone();
                    tokio::spawn(async move {
                        let result = run_captured(argv, origin).await;
                        let msg = match reply {
                            Reply::FileList => Message::FilesListed(result),
                            Reply::Finished => Message::Finished(result),
                        };
                        events.post(msg);
                    });
                }
                Effect::Interactive { argv, origin } => {
                    let result = hand_off(&argv, origin, terminal, control);
                    self.events.post(Message::Finished(result));
                }
                Effect::Emit(msg) => {
                    self.events.post(msg);
                }
                Effect::StartTicker(period) => {
                    self.ticker = Some(Ticker::spawn(self.events.clone(), period));
                }
                Effect::Quit => {
                    self.model.should_quit = true;
                }
            }
        }
        Ok(())
    }
}

/// Run an interactive child with the terminal released. Terminal failures
/// become a failed result; the loop keeps running either way.
fn hand_off<B: Backend>(
    argv: &[String],
    origin: SelectedCommand,
    terminal: &mut Terminal<B>,
    control: &mut dyn TerminalControl,
) -> CommandResult {
    if let Err(e) = control.suspend() {
        tracing::warn!(error = %format!("{e:#}"), "cannot release terminal");
        // suspend may have got halfway
        let _ = reclaim(terminal, control);
        return CommandResult::failure(DispatchError::Terminal(format!("{e:#}")));
    }

    let result = run_interactive(argv, origin);

    match reclaim(terminal, control) {
        Ok(()) => result,
        Err(e) => {
            tracing::warn!(error = %format!("{e:#}"), "cannot reclaim terminal");
            match result {
                CommandResult::Success { .. } => {
                    CommandResult::failure(DispatchError::Terminal(format!("{e:#}")))
                }
                failure => failure,
            }
        }
    }
}

fn reclaim<B: Backend>(
    terminal: &mut Terminal<B>,
    control: &mut dyn TerminalControl,
) -> Result<()> {
    control.resume()?;
    terminal
        .clear()
        .map_err(|e| anyhow!("Failed to clear terminal: {e}"))
}
