//! Model state tests
//!
//! Layout allotment across resizes, focus transfer on dispatch and the
//! one-command-at-a-time guard.

use cfsd_panel::config::Config;
use cfsd_panel::sandbox::{CommandKind, CommandResult, DispatchError, SelectedCommand};
use cfsd_panel::ui::app::{Focus, Model, FRAME, MAX_HEIGHT, MIN_HEIGHT, VIEWER_MIN_HEIGHT};
use cfsd_panel::ui::event::{Effect, EventSink, Message, Reply};
use cfsd_panel::ui::selector;
use cfsd_panel::ui::viewer::FALLBACK_LABEL;

fn create_test_model() -> Model {
    let (sink, _rx) = EventSink::channel();
    Model::new(&Config::default(), sink)
}

#[test]
fn test_allotment_never_exceeds_clamped_height() {
    let mut model = create_test_model();
    let messages = [
        "short".to_string(),
        "a somewhat longer status message that wraps on narrow terminals".to_string(),
        "x ".repeat(400),
    ];

    for message in &messages {
        model.update(Message::Status(message.clone()));
        for width in (0..=260).step_by(13) {
            for height in 0..=130 {
                model.handle_resize(width, height);
                let (_, clamped) = model.size();
                let a = model.allotment();

                assert!(clamped >= MIN_HEIGHT && clamped <= MAX_HEIGHT);
                assert!(
                    a.total_height() <= clamped - FRAME,
                    "{width}x{height}: {a:?} exceeds {clamped}"
                );
                assert!(a.viewer >= VIEWER_MIN_HEIGHT, "{width}x{height}: {a:?}");
                assert!(a.selector <= selector::MAX_HEIGHT);
            }
        }
    }
}

#[test]
fn test_viewer_takes_the_remainder() {
    let mut model = create_test_model();
    model.handle_resize(120, 60);
    let a = model.allotment();
    assert_eq!(a.total_height(), 60 - FRAME);
    assert_eq!(a.selector, selector::MAX_HEIGHT);
    assert_eq!(a.viewer, 60 - FRAME - selector::MAX_HEIGHT - a.status);
}

#[test]
fn test_huge_session_length_starts_counting() {
    let (sink, _rx) = EventSink::channel();
    let config = Config {
        session_minutes: u64::MAX,
        ..Config::default()
    };
    let model = Model::new(&config, sink);
    assert!(!model.status.remaining().is_zero());
    assert!(model.status.clock_label().starts_with("Remaining: "));
}

#[test]
fn test_starts_focused_on_selector() {
    let model = create_test_model();
    assert_eq!(model.focus(), Focus::Selector);
    assert!(!model.should_quit);
    assert_eq!(model.status.message(), "no new message");
}

#[test]
fn test_list_files_selection_keeps_focus() {
    let mut model = create_test_model();
    let effects = model.update(Message::Selected(SelectedCommand::new(
        CommandKind::ListFiles,
        "/files/readme.txt",
    )));
    assert!(effects.is_empty());
    assert_eq!(model.focus(), Focus::Selector);
    assert!(model.in_flight().is_none());
}

#[test]
fn test_open_file_moves_focus_and_captures() {
    let mut model = create_test_model();
    let cmd = SelectedCommand::new(CommandKind::OpenFile, "/files/readme.txt");
    let effects = model.update(Message::Selected(cmd.clone()));

    assert_eq!(model.focus(), Focus::Viewer);
    assert_eq!(model.in_flight(), Some(&cmd));
    match effects.as_slice() {
        [Effect::Capture {
            argv,
            origin,
            reply: Reply::Finished,
        }] => {
            assert_eq!(origin, &cmd);
            assert_eq!(argv.last().map(String::as_str), Some("/files/readme.txt"));
            assert_eq!(argv[argv.len() - 2], "/bin/cat");
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn test_open_shell_moves_focus_and_goes_interactive() {
    let mut model = create_test_model();
    let effects = model.update(Message::Selected(SelectedCommand::new(
        CommandKind::OpenShell,
        selector::SHELL_OPTION,
    )));

    assert_eq!(model.focus(), Focus::Viewer);
    match effects.as_slice() {
        [Effect::Interactive { argv, .. }] => {
            assert_eq!(argv.last().map(String::as_str), Some("/bin/sh"));
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn test_option_like_path_is_a_synthesized_failure() {
    let mut model = create_test_model();
    let effects = model.update(Message::Selected(SelectedCommand::new(
        CommandKind::OpenFile,
        "--help",
    )));

    assert_eq!(model.focus(), Focus::Viewer);
    assert!(model.in_flight().is_none());
    assert!(matches!(
        effects.as_slice(),
        [Effect::Emit(Message::Finished(CommandResult::Failure {
            error: DispatchError::Argv(_),
            ..
        }))]
    ));
}

#[test]
fn test_success_fills_viewer_and_status() {
    let mut model = create_test_model();
    let cmd = SelectedCommand::new(CommandKind::OpenFile, "/files/notes.md");
    model.update(Message::Selected(cmd.clone()));

    model.update(Message::Finished(CommandResult::Success {
        bytes: b"# Notes\n\nsome text".to_vec(),
        origin: cmd,
    }));

    assert!(model.in_flight().is_none());
    assert_eq!(model.viewer.buffer().label, "/files/notes.md");
    assert!(model.viewer.render_to_string().contains("# Notes"));
    assert_eq!(
        model.status.message(),
        "command finished: Open file /files/notes.md"
    );
}

#[test]
fn test_failure_shows_stderr() {
    let mut model = create_test_model();
    model.update(Message::Finished(CommandResult::Failure {
        stderr: b"cat: /files/x: No such file or directory".to_vec(),
        error: DispatchError::NotFound {
            program: "/usr/sbin/chroot".to_string(),
        },
    }));

    assert_eq!(model.viewer.buffer().label, "stderr");
    assert_eq!(
        model.viewer.render_to_string(),
        "cat: /files/x: No such file or directory"
    );
    assert_eq!(
        model.status.message(),
        "command failed: /usr/sbin/chroot: binary not found"
    );
}

#[test]
fn test_failure_without_stderr_shows_fallback() {
    let mut model = create_test_model();
    model.update(Message::Finished(CommandResult::failure(
        DispatchError::EmptyArgv,
    )));
    assert_eq!(model.viewer.buffer().label, FALLBACK_LABEL);
    assert!(model.status.message().starts_with("command failed"));
}

#[test]
fn test_busy_guard_released_after_result() {
    let mut model = create_test_model();
    let cmd = SelectedCommand::new(CommandKind::OpenFile, "/files/a.txt");
    assert_eq!(model.update(Message::Selected(cmd.clone())).len(), 1);
    assert!(model.update(Message::Selected(cmd.clone())).is_empty());

    model.update(Message::Finished(CommandResult::Success {
        bytes: b"a".to_vec(),
        origin: cmd.clone(),
    }));
    assert_eq!(model.update(Message::Selected(cmd)).len(), 1);
}

#[test]
fn test_identical_results_do_not_rerender() {
    let mut model = create_test_model();
    let cmd = SelectedCommand::new(CommandKind::OpenFile, "/files/a.txt");
    let result = || CommandResult::Success {
        bytes: b"same bytes".to_vec(),
        origin: cmd.clone(),
    };

    model.update(Message::Finished(result()));
    model.viewer.render_to_string();
    let renders = model.viewer.render_count();

    model.update(Message::Finished(result()));
    assert!(!model.viewer.is_dirty());
    model.viewer.render_to_string();
    assert_eq!(model.viewer.render_count(), renders);
}
