use std::cell::RefCell;
use std::path::Path;
use std::process::ExitStatus;
use std::rc::Rc;

use tempfile::TempDir;

use nte_core::config::NteConfig;
use nte_core::hooks::{HookCommands, Hooks};
use nte_core::shell::{ShellError, ShellRunner};
use nte_core::store::{NoteStore, StoreError};
use nte_core::todo::{add_task, complete_task};

#[derive(Clone, Default)]
struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
    fail: bool,
}

impl Recorder {
    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

#[cfg(unix)]
fn status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

impl ShellRunner for Recorder {
    fn run_shell(
        &self,
        command: &str,
        cwd: Option<&Path>,
        _quiet: bool,
    ) -> Result<ExitStatus, ShellError> {
        assert!(cwd.is_some(), "hooks run inside the notes root");
        self.calls.borrow_mut().push(command.to_string());
        Ok(status(if self.fail { 1 } else { 0 }))
    }

    fn run_argv(&self, argv: &[String], _cwd: Option<&Path>) -> Result<ExitStatus, ShellError> {
        self.calls.borrow_mut().push(argv.join(" "));
        Ok(status(0))
    }
}

fn commands(sync: Option<&str>) -> HookCommands {
    HookCommands {
        before: Some("pull".to_string()),
        after: Some("push".to_string()),
        sync: sync.map(str::to_string),
    }
}

fn hooks(recorder: &Recorder, root: &Path, sync: Option<&str>) -> Hooks {
    Hooks::new(commands(sync), root, Box::new(recorder.clone()))
}

#[test]
fn nested_wrapped_operations_run_hooks_once() {
    let temp = TempDir::new().expect("tempdir");
    let store = NoteStore::open(temp.path()).expect("open store");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), None);

    let session = hooks.session();
    session
        .wrap(|| -> Result<(), StoreError> {
            session.wrap(|| add_task(&store, "TODOS", "one"))?;
            assert_eq!(recorder.calls(), vec!["pull"]);
            session.wrap(|| complete_task(&store, "TODOS", "one", false))
        })
        .expect("wrapped");

    assert_eq!(recorder.calls(), vec!["pull", "push"]);
}

#[test]
fn after_hook_runs_when_the_body_fails() {
    let temp = TempDir::new().expect("tempdir");
    let store = NoteStore::open(temp.path()).expect("open store");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), None);

    let session = hooks.session();
    let result = session.wrap(|| store.read("missing"));
    assert!(matches!(result, Err(StoreError::NotFound(_))));
    assert_eq!(recorder.calls(), vec!["pull", "push"]);
}

#[test]
fn separate_sessions_run_hooks_again() {
    let temp = TempDir::new().expect("tempdir");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), None);

    hooks.session().wrap(|| ());
    hooks.session().wrap(|| ());
    assert_eq!(recorder.calls(), vec!["pull", "push", "pull", "push"]);
}

#[test]
fn sequential_wraps_in_one_session_do_not_repeat_hooks() {
    let temp = TempDir::new().expect("tempdir");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), None);

    let session = hooks.session();
    session.wrap(|| ());
    session.wrap(|| ());
    session.before();
    assert_eq!(recorder.calls(), vec!["pull", "push"]);
}

#[test]
fn failing_hooks_do_not_block_the_operation() {
    let temp = TempDir::new().expect("tempdir");
    let store = NoteStore::open(temp.path()).expect("open store");
    let recorder = Recorder {
        fail: true,
        ..Recorder::default()
    };
    let hooks = hooks(&recorder, temp.path(), None);

    hooks
        .session()
        .wrap(|| store.write("k", "v", true))
        .expect("write despite failing hooks");
    assert_eq!(store.read("k").expect("read"), "v");
    assert_eq!(recorder.calls(), vec!["pull", "push"]);
}

#[test]
fn sync_replaces_before_and_after_when_configured() {
    let temp = TempDir::new().expect("tempdir");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), Some("rsync"));
    hooks.session().sync();
    assert_eq!(recorder.calls(), vec!["rsync"]);
}

#[test]
fn sync_falls_back_to_before_then_after() {
    let temp = TempDir::new().expect("tempdir");
    let recorder = Recorder::default();
    let hooks = hooks(&recorder, temp.path(), None);
    hooks.session().sync();
    assert_eq!(recorder.calls(), vec!["pull", "push"]);
}

#[test]
fn blank_hook_commands_are_ignored() {
    let mut config = NteConfig::with_notes_dir("/tmp/notes");
    config.before = Some("   ".to_string());
    config.after = Some("git push".to_string());
    let commands = HookCommands::from_config(&config);
    assert_eq!(commands.before, None);
    assert_eq!(commands.after.as_deref(), Some("git push"));

    let recorder = Recorder::default();
    let hooks = Hooks::new(commands, "/tmp/notes", Box::new(recorder.clone()));
    hooks.session().wrap(|| ());
    assert_eq!(recorder.calls(), vec!["git push"]);
}
