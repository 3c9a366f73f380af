//! # Sandbox Command Factory
//!
//! Pure argv construction for jailed commands. Nothing here touches the
//! filesystem or spawns a process; the dispatcher consumes the result.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// The commands the panel knows how to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ListFiles,
    OpenFile,
    OpenShell,
    /// Offered in the menu but never implemented.
    ChangeTheme,
}

impl CommandKind {
    /// Stage-one menu, in display order.
    pub const MENU: [CommandKind; 4] = [
        CommandKind::ListFiles,
        CommandKind::OpenFile,
        CommandKind::OpenShell,
        CommandKind::ChangeTheme,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CommandKind::ListFiles => "List files",
            CommandKind::OpenFile => "Open file",
            CommandKind::OpenShell => "Open terminal",
            CommandKind::ChangeTheme => "Change panel theme",
        }
    }

    /// Whether the second stage of the selector lists jail files.
    pub fn needs_file_list(self) -> bool {
        matches!(self, CommandKind::ListFiles | CommandKind::OpenFile)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A completed selection: what to run and on what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedCommand {
    pub kind: CommandKind,
    /// A jail path for file commands, the option label otherwise.
    pub argument: String,
}

impl SelectedCommand {
    pub fn new(kind: CommandKind, argument: impl Into<String>) -> Self {
        Self {
            kind,
            argument: argument.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgvError {
    #[error("no command for '{0}'")]
    Unsupported(CommandKind),

    #[error("no file selected")]
    EmptyPath,

    #[error("refusing path that looks like an option: {0}")]
    OptionLikePath(String),
}

/// Fixed identity and layout of the jail.
///
/// Read once from configuration at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Jail {
    pub chroot_path: String,
    pub home_root: String,
    pub user_name: String,
    pub uid: u32,
    pub gid: u32,
    pub setpriv_path: String,
    pub cat_path: String,
    pub find_path: String,
    /// Directory inside the jail that holds the user's files.
    pub files_dir: String,
    pub shell_path: String,
}

impl Default for Jail {
    fn default() -> Self {
        Self {
            chroot_path: "/usr/sbin/chroot".to_string(),
            home_root: "/home".to_string(),
            user_name: "u214528".to_string(),
            uid: 1001,
            gid: 1001,
            setpriv_path: "/bin/setpriv".to_string(),
            cat_path: "/bin/cat".to_string(),
            find_path: "/bin/find".to_string(),
            files_dir: "/files".to_string(),
            shell_path: "/bin/sh".to_string(),
        }
    }
}

impl Jail {
    /// The directory the chroot pivots into.
    pub fn root(&self) -> String {
        format!("{}/{}", self.home_root.trim_end_matches('/'), self.user_name)
    }

    /// chroot <root> setpriv --nnp --regid <gid> --reuid <uid> --clear-groups --reset-env
    fn prefix(&self) -> Vec<String> {
        vec![
            self.chroot_path.clone(),
            self.root(),
            self.setpriv_path.clone(),
            "--nnp".to_string(),
            "--regid".to_string(),
            self.gid.to_string(),
            "--reuid".to_string(),
            self.uid.to_string(),
            "--clear-groups".to_string(),
            "--reset-env".to_string(),
        ]
    }

    pub fn list_files(&self) -> Vec<String> {
        let mut argv = self.prefix();
        argv.extend([
            self.find_path.clone(),
            self.files_dir.clone(),
            "-type".to_string(),
            "f".to_string(),
        ]);
        argv
    }

    pub fn open_file(&self, path: &str) -> Result<Vec<String>, ArgvError> {
        if path.trim().is_empty() {
            return Err(ArgvError::EmptyPath);
        }
        if path.starts_with('-') {
            return Err(ArgvError::OptionLikePath(path.to_string()));
        }

        let mut argv = self.prefix();
        argv.extend([self.cat_path.clone(), path.to_string()]);
        Ok(argv)
    }

    pub fn shell(&self) -> Vec<String> {
        let mut argv = self.prefix();
        argv.push(self.shell_path.clone());
        argv
    }

    /// Build the argv for a selection.
    pub fn argv_for(&self, cmd: &SelectedCommand) -> Result<Vec<String>, ArgvError> {
        match cmd.kind {
            CommandKind::ListFiles => Ok(self.list_files()),
            CommandKind::OpenFile => self.open_file(&cmd.argument),
            CommandKind::OpenShell => Ok(self.shell()),
            CommandKind::ChangeTheme => Err(ArgvError::Unsupported(cmd.kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: [&str; 10] = [
        "/usr/sbin/chroot",
        "/home/u214528",
        "/bin/setpriv",
        "--nnp",
        "--regid",
        "1001",
        "--reuid",
        "1001",
        "--clear-groups",
        "--reset-env",
    ];

    #[test]
    fn test_open_file_argv_order() {
        let argv = Jail::default()
            .open_file("/files/readme.txt")
            .expect("argv");

        let mut expected: Vec<&str> = PREFIX.to_vec();
        expected.extend(["/bin/cat", "/files/readme.txt"]);
        assert_eq!(argv, expected);
    }

    #[test]
    fn test_list_files_argv() {
        let argv = Jail::default().list_files();
        assert_eq!(&argv[..10], &PREFIX);
        assert_eq!(&argv[10..], &["/bin/find", "/files", "-type", "f"]);
    }

    #[test]
    fn test_shell_argv() {
        let argv = Jail::default().shell();
        assert_eq!(argv.len(), 11);
        assert_eq!(argv.last().map(String::as_str), Some("/bin/sh"));
    }

    #[test]
    fn test_custom_identity_flows_into_prefix() {
        let jail = Jail {
            home_root: "/srv/jails/".to_string(),
            user_name: "guest".to_string(),
            uid: 2000,
            gid: 3000,
            ..Jail::default()
        };
        let argv = jail.shell();
        assert_eq!(argv[1], "/srv/jails/guest");
        assert_eq!(argv[5], "3000");
        assert_eq!(argv[7], "2000");
    }

    #[test]
    fn test_open_file_rejects_empty_path() {
        assert_eq!(Jail::default().open_file("  "), Err(ArgvError::EmptyPath));
    }

    #[test]
    fn test_open_file_rejects_option_like_path() {
        assert!(matches!(
            Jail::default().open_file("--help"),
            Err(ArgvError::OptionLikePath(_))
        ));
    }

    #[test]
    fn test_change_theme_is_unsupported() {
        let cmd = SelectedCommand::new(CommandKind::ChangeTheme, "not implemented");
        let err = Jail::default().argv_for(&cmd).unwrap_err();
        assert_eq!(err.to_string(), "no command for 'Change panel theme'");
    }

    #[test]
    fn test_argv_for_dispatches_by_kind() {
        let jail = Jail::default();
        let open = SelectedCommand::new(CommandKind::OpenFile, "/files/a.md");
        assert_eq!(
            jail.argv_for(&open).expect("open").last().map(String::as_str),
            Some("/files/a.md")
        );
        let list = SelectedCommand::new(CommandKind::ListFiles, "");
        assert_eq!(jail.argv_for(&list).expect("list"), jail.list_files());
    }

    #[test]
    fn test_deserialize_partial_jail_uses_defaults() {
        let jail: Jail = serde_json::from_str(r#"{"uid": 4242}"#).expect("deserialize");
        assert_eq!(jail.uid, 4242);
        assert_eq!(jail.gid, 1001);
        assert_eq!(jail.root(), "/home/u214528");
    }
}
