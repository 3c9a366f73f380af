//! # Sandbox Module
//!
//! Everything the panel runs goes through a chroot jail and a privilege drop.
//! This module builds those invocations and runs them.
//!
//! ## Components
//!
//! - [`factory`] - pure argv construction per [`CommandKind`]
//! - [`dispatcher`] - execution in captured or interactive mode
//!
//! ## Invocation Shape
//!
//! ```text
//! <chroot> <home>/<user> <setpriv> --nnp --regid <gid> --reuid <uid> --clear-groups --reset-env <suffix...>
//! ```
//!
//! | Kind | Suffix | Mode |
//! |------|--------|------|
//! | ListFiles | `find <files-dir> -type f` | Captured |
//! | OpenFile | `cat <path>` | Captured |
//! | OpenShell | `sh` | Interactive |
//! | ChangeTheme | (none, rejected) | - |

pub mod dispatcher;
pub mod factory;

pub use dispatcher::{CommandResult, DispatchError, ExecutionMode};
pub use factory::{ArgvError, CommandKind, Jail, SelectedCommand};
