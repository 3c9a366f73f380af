//! Messages, effects and the outbound message sink.
//!
//! Every state change in the panel starts as a [`Message`] processed by the
//! model. Updates answer with [`Effect`]s, which the runtime executes off the
//! update path; anything they produce comes back as another message.

use crate::sandbox::{CommandResult, SelectedCommand};
use crossterm::event::{Event, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub enum Message {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Tick,
    /// The selector finished a two-stage choice.
    Selected(SelectedCommand),
    /// The selector's file listing came back.
    FilesListed(CommandResult),
    /// A dispatched command came back.
    Finished(CommandResult),
    Status(String),
}

impl Message {
    /// Translate a raw terminal event. Key releases and mouse input are dropped.
    pub fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(Message::Key(key)),
            Event::Resize(width, height) => Some(Message::Resize { width, height }),
            _ => None,
        }
    }
}

/// Where the output of a captured command should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    FileList,
    Finished,
}

#[derive(Debug)]
pub enum Effect {
    Capture {
        argv: Vec<String>,
        origin: SelectedCommand,
        reply: Reply,
    },
    Interactive {
        argv: Vec<String>,
        origin: SelectedCommand,
    },
    /// Queue a message behind everything already waiting.
    Emit(Message),
    StartTicker(Duration),
    Quit,
}

/// Posting end of the runtime's message queue.
///
/// Widgets get a clone at construction time and use it only to post; they
/// never read the queue.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<Message>,
}

impl EventSink {
    pub fn channel() -> (Self, UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Returns false once the runtime has shut down.
    pub fn post(&self, msg: Message) -> bool {
        match self.tx.send(msg) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(dropped = ?e.0, "event loop gone, message discarded");
                false
            }
        }
    }
}
