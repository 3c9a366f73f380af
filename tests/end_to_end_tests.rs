//! End-to-end dispatch tests
//!
//! These drive the model and the dispatcher together. The jail prefix is
//! pointed at harmless binaries (`sh`, `true`, `echo`) so the real argv shape
//! runs without root.

use cfsd_panel::config::Config;
use cfsd_panel::sandbox::dispatcher::{run_captured, run_interactive};
use cfsd_panel::sandbox::{CommandKind, CommandResult, Jail, SelectedCommand};
use cfsd_panel::ui::app::{Focus, Model};
use cfsd_panel::ui::event::{Effect, EventSink, Message, Reply};
use cfsd_panel::ui::selector::{Stage, SHELL_OPTION};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

const STDERR_LINE: &str = "find: '/files': Permission denied";

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::empty()))
}

/// A jail whose "chroot" is `sh` running a script in place of the jail root.
fn scripted_jail(dir: &TempDir, script: &str) -> Jail {
    fs::write(dir.path().join("jail.sh"), script).unwrap();
    Jail {
        chroot_path: "sh".to_string(),
        home_root: dir.path().to_str().unwrap().to_string(),
        user_name: "jail.sh".to_string(),
        ..Jail::default()
    }
}

fn model_with(jail: Jail) -> (Model, UnboundedReceiver<Message>) {
    let (sink, rx) = EventSink::channel();
    let config = Config {
        jail,
        ..Config::default()
    };
    let mut model = Model::new(&config, sink);
    model.handle_resize(120, 40);
    (model, rx)
}

fn single_effect(effects: Vec<Effect>) -> Effect {
    assert_eq!(effects.len(), 1, "{effects:?}");
    effects.into_iter().next().unwrap()
}

#[tokio::test]
async fn test_list_files_fetch_failure_reaches_viewer() {
    let dir = TempDir::new().unwrap();
    let jail = scripted_jail(&dir, &format!("echo \"{STDERR_LINE}\" >&2\nexit 1\n"));
    let (mut model, mut rx) = model_with(jail);

    // "List files" is the first menu entry
    let effect = single_effect(model.update(key(KeyCode::Enter)));
    assert_eq!(model.selector.stage(), Stage::PickOption);
    assert!(model.selector.is_fetching());

    let Effect::Capture {
        argv,
        origin,
        reply,
    } = effect
    else {
        panic!("expected a captured listing");
    };
    assert_eq!(reply, Reply::FileList);

    let result = run_captured(argv, origin).await;
    assert!(!result.is_success());
    assert!(model.update(Message::FilesListed(result)).is_empty());
    assert!(model.selector.options().is_empty());

    let forwarded = rx.try_recv().expect("failure forwarded by the selector");
    assert!(matches!(
        forwarded,
        Message::Finished(CommandResult::Failure { .. })
    ));
    model.update(forwarded);

    assert_eq!(model.viewer.buffer().label, "stderr");
    assert_eq!(model.viewer.render_to_string(), STDERR_LINE);
    assert!(
        model.status.message().starts_with("command failed: sh exited with"),
        "{}",
        model.status.message()
    );
    assert_eq!(model.focus(), Focus::Selector);
    assert!(!model.should_quit);
}

#[tokio::test]
async fn test_list_files_success_populates_options() {
    let dir = TempDir::new().unwrap();
    let jail = scripted_jail(&dir, "printf '/files/a.txt\\n\\n  /files/b.md  \\n'\n");
    let (mut model, mut rx) = model_with(jail);

    // Down to "Open file"
    model.update(key(KeyCode::Down));
    let Effect::Capture { argv, origin, .. } = single_effect(model.update(key(KeyCode::Enter)))
    else {
        panic!("expected a captured listing");
    };

    model.update(Message::FilesListed(run_captured(argv, origin).await));
    assert!(rx.try_recv().is_err());
    assert_eq!(model.selector.options(), vec!["/files/a.txt", "/files/b.md"]);

    // Second file, then confirm
    model.update(key(KeyCode::Down));
    let Effect::Emit(selected) = single_effect(model.update(key(KeyCode::Enter))) else {
        panic!("expected the selection to be emitted");
    };
    let Message::Selected(cmd) = selected else {
        panic!("expected Message::Selected");
    };
    assert_eq!(
        cmd,
        SelectedCommand::new(CommandKind::OpenFile, "/files/b.md")
    );
    assert_eq!(model.selector.stage(), Stage::PickKind);
}

#[tokio::test]
async fn test_open_file_success_reaches_viewer() {
    let jail = Jail {
        chroot_path: "echo".to_string(),
        ..Jail::default()
    };
    let (mut model, _rx) = model_with(jail);

    let cmd = SelectedCommand::new(CommandKind::OpenFile, "/files/readme.txt");
    let Effect::Capture {
        argv,
        origin,
        reply: Reply::Finished,
    } = single_effect(model.update(Message::Selected(cmd)))
    else {
        panic!("expected a captured open");
    };

    let result = run_captured(argv, origin).await;
    assert!(result.is_success());
    model.update(Message::Finished(result));

    assert_eq!(model.viewer.buffer().label, "/files/readme.txt");
    assert!(model
        .viewer
        .render_to_string()
        .ends_with("--reset-env /bin/cat /files/readme.txt"));
    assert_eq!(
        model.status.message(),
        "command finished: Open file /files/readme.txt"
    );
}

#[test]
fn test_open_shell_is_interactive_and_carries_no_bytes() {
    let jail = Jail {
        chroot_path: "true".to_string(),
        ..Jail::default()
    };
    let (mut model, _rx) = model_with(jail);

    let cmd = SelectedCommand::new(CommandKind::OpenShell, SHELL_OPTION);
    let Effect::Interactive { argv, origin } = single_effect(model.update(Message::Selected(cmd)))
    else {
        panic!("expected the shell to run interactively");
    };

    match run_interactive(&argv, origin) {
        CommandResult::Success { bytes, origin } => {
            assert!(bytes.is_empty());
            assert_eq!(origin.kind, CommandKind::OpenShell);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
