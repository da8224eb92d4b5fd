use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        Self::with_config(|_| String::new())
    }

    /// `extra` receives the notes dir and returns additional JSON members.
    fn with_config(extra: impl FnOnce(&Path) -> String) -> Self {
        let temp = TempDir::new().expect("tempdir");
        let notes = temp.path().join("notes");
        let extra = extra(&notes);
        let body = format!(
            "{{\"notes_dir\": {:?}{}}}",
            notes.to_string_lossy(),
            if extra.is_empty() {
                String::new()
            } else {
                format!(", {}", extra)
            }
        );
        fs::write(temp.path().join("config.json"), body).expect("write config");
        Self { temp }
    }

    fn notes(&self) -> PathBuf {
        self.temp.path().join("notes")
    }

    fn nte(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_nte"))
            .env("NTE_CONFIG", self.temp.path().join("config.json"))
            .env("HOME", self.temp.path())
            .env("NO_COLOR", "1")
            .args(args)
            .output()
            .expect("run nte")
    }

    fn ok(&self, args: &[&str]) -> String {
        let out = self.nte(args);
        assert!(
            out.status.success(),
            "nte {:?} failed: {}",
            args,
            String::from_utf8_lossy(&out.stderr)
        );
        String::from_utf8(out.stdout).expect("utf8")
    }
}

#[test]
fn set_get_and_overwrite_gate() {
    let env = Env::new();
    env.ok(&["set", "greeting", "hello"]);
    assert_eq!(env.ok(&["get", "greeting"]), "hello\n");

    // stdin is closed, so the confirmation prompt answers no.
    let out = env.nte(&["set", "greeting", "bye"]);
    assert!(!out.status.success());
    assert_eq!(env.ok(&["get", "greeting"]), "hello\n");

    env.ok(&["set", "greeting", "bye", "--overwrite"]);
    assert_eq!(env.ok(&["get", "greeting"]), "bye\n");
}

#[test]
fn missing_key_reports_no_value_stored() {
    let env = Env::new();
    let out = env.nte(&["get", "nothing"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No value stored for nothing!"));
}

#[test]
fn more_appends_with_separator() {
    let env = Env::new();
    env.ok(&["more", "log", "one"]);
    env.ok(&["more", "log", "two"]);
    env.ok(&["more", "log", "three", "--sep", ", "]);
    assert_eq!(
        fs::read_to_string(env.notes().join("log")).expect("read"),
        "one\ntwo, three"
    );
}

#[test]
fn todo_lifecycle() {
    let env = Env::new();
    env.ok(&["todo", "buy milk"]);
    env.ok(&["todo", "eggs"]);
    env.ok(&["done", "buy milk"]);

    let out = env.nte(&["done", "buy milk"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("--create"));

    env.ok(&["done", "bread", "--create"]);
    let todos = env.ok(&["todos"]);
    assert!(todos.contains("- [x] buy milk (Completed: "));
    assert!(todos.contains("- [ ] eggs"));
    assert!(todos.contains("- [x] bread (Completed: "));

    env.ok(&["clear-done"]);
    assert_eq!(env.ok(&["todos"]), "- [ ] eggs\n");

    env.ok(&["todo", "walk", "--key", "chores"]);
    env.ok(&["todo-remove", "walk", "--key", "chores"]);
    assert_eq!(env.ok(&["get", "chores"]), "\n");
}

#[test]
fn events_print_latest_first() {
    let env = Env::new();
    env.ok(&["event", "proj", "--details", "did X"]);
    env.ok(&["event", "proj", "--details", "did Y"]);
    let out = env.ok(&["events", "proj"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("* did Y"));
    assert!(lines[1].ends_with("* did X"));
}

#[test]
fn that_appends_to_todays_note() {
    let env = Env::new();
    env.ok(&["that", "first thought"]);
    env.ok(&["that", "second thought"]);
    assert_eq!(env.ok(&["today"]), "first thought\nsecond thought\n");
}

#[test]
fn recent_and_ls_order_newest_first() {
    let env = Env::new();
    for key in ["A", "B", "C"] {
        env.ok(&["set", key, &format!("{key}1\n{key}2\n{key}3\n{key}4")]);
        std::thread::sleep(std::time::Duration::from_millis(20));
    }
    assert_eq!(env.ok(&["ls"]), "C\nB\nA\n");

    let recent = env.ok(&["recent", "--amount", "2", "--lines", "2"]);
    let lines: Vec<&str> = recent.lines().map(str::trim_end).collect();
    assert_eq!(
        lines,
        vec![
            "C", " 1  C1", " 2  C2", " 3  ...", "", "B", " 1  B1", " 2  B2", " 3  ...", ""
        ]
    );
}

#[test]
fn delete_removes_note() {
    let env = Env::new();
    env.ok(&["set", "tmp", "x"]);
    env.ok(&["delete", "tmp"]);
    assert!(!env.notes().join("tmp").exists());
    assert!(!env.nte(&["delete", "tmp"]).status.success());
}

#[test]
fn random_prints_one_of_the_lines() {
    let env = Env::new();
    env.ok(&["set", "quotes", "a\nb\nc"]);
    let line = env.ok(&["random", "quotes"]);
    assert!(["a\n", "b\n", "c\n"].contains(&line.as_str()), "{line}");
}

#[cfg(unix)]
#[test]
fn run_executes_note_and_marks_it_executable() {
    use std::os::unix::fs::PermissionsExt;

    let env = Env::new();
    env.ok(&["set", "hello", "echo hi from note"]);
    assert_eq!(env.ok(&["run", "hello"]), "hi from note\n");
    let mode = fs::metadata(env.notes().join("hello"))
        .expect("metadata")
        .permissions()
        .mode();
    assert!(mode & 0o100 != 0);

    env.ok(&["set", "fails", "exit 4"]);
    assert_eq!(env.nte(&["run", "fails"]).status.code(), Some(4));
}

#[cfg(unix)]
#[test]
fn hooks_run_once_per_command() {
    let env = Env::with_config(|_| {
        r#""before": "echo before >> .hooks.log", "after": "echo after >> .hooks.log""#
            .to_string()
    });
    env.ok(&["todo", "a"]);
    env.ok(&["done", "b", "--create"]);
    env.ok(&["ls"]);

    let log = fs::read_to_string(env.notes().join(".hooks.log")).expect("hook log");
    assert_eq!(log, "before\nafter\nbefore\nafter\nbefore\n");
    assert_eq!(env.ok(&["ls"]), "TODOS\n");
}

#[cfg(unix)]
#[test]
fn sync_prefers_sync_command() {
    let env = Env::with_config(|_| {
        r#""before": "echo before >> .hooks.log", "sync": "echo sync >> .hooks.log""#.to_string()
    });
    env.ok(&["sync"]);
    let log = fs::read_to_string(env.notes().join(".hooks.log")).expect("hook log");
    assert_eq!(log, "sync\n");
}

#[cfg(unix)]
#[test]
fn failing_hooks_do_not_fail_the_command() {
    let env = Env::with_config(|_| r#""before": "exit 1", "after": "false""#.to_string());
    env.ok(&["set", "k", "v"]);
    assert_eq!(env.ok(&["get", "k"]), "v\n");
}

#[test]
fn version_prints_package_version() {
    let env = Env::new();
    let out = env.ok(&["version"]);
    assert!(out.starts_with("nte "));
}
