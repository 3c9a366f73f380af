//! # UI Module
//!
//! The full-screen panel: three widgets, the model that owns them and the
//! loop that drives it.
//!
//! ## Components
//!
//! - [`Model`] - focus, geometry and top-level message dispatch
//! - [`selector`] - two-stage command form
//! - [`viewer`] - lazily rendered content pane
//! - [`status_bar`] - session countdown and status message
//! - [`runtime`] - event loop and effect execution
//! - [`mod@render`] - frame layout
//!
//! ## Layout
//!
//! ```text
//! ╔══════════════════ cfsd panel ══════════════════╗
//! ║┌──────────────────────────────────────────────┐║
//! ║│ Command Selector (at most 10 rows)           │║
//! ║└──────────────────────────────────────────────┘║
//! ║┌──────────────────────────────────────────────┐║
//! ║│ Content Viewer (the rest, at least 10 rows)  │║
//! ║│                            label  scroll: 0% │║
//! ║└──────────────────────────────────────────────┘║
//! ║┌──────────────────────────────────────────────┐║
//! ║│ status message          Remaining: 09:59.500 │║
//! ║└──────────────────────────────────────────────┘║
//! ╚════════════════════════════════════════════════╝
//! ```

pub mod app;
pub mod event;
pub mod keys;
pub mod render;
pub mod runtime;
pub mod selector;
pub mod status_bar;
pub mod viewer;

pub use app::{Focus, Model};
pub use render::render;
pub use runtime::{CrosstermControl, CrosstermEventReader, EventReader, Runtime, TerminalControl};
