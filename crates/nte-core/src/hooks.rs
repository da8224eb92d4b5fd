use std::cell::Cell;
use std::path::{Path, PathBuf};

use crate::config::NteConfig;
use crate::shell::{ShellRunner, SystemShell};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookCommands {
    pub before: Option<String>,
    pub after: Option<String>,
    pub sync: Option<String>,
}

impl HookCommands {
    pub fn from_config(config: &NteConfig) -> Self {
        Self {
            before: non_empty(config.before.as_deref()),
            after: non_empty(config.after.as_deref()),
            sync: non_empty(config.sync.as_deref()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Configured before/after/sync shell hooks, run with the notes root as working directory.
pub struct Hooks {
    commands: HookCommands,
    cwd: PathBuf,
    runner: Box<dyn ShellRunner>,
}

impl Hooks {
    pub fn new(commands: HookCommands, cwd: impl Into<PathBuf>, runner: Box<dyn ShellRunner>) -> Self {
        Self {
            commands,
            cwd: cwd.into(),
            runner,
        }
    }

    pub fn from_config(config: &NteConfig) -> Self {
        Self::new(
            HookCommands::from_config(config),
            config.notes_dir.clone(),
            Box::new(SystemShell),
        )
    }

    pub fn commands(&self) -> &HookCommands {
        &self.commands
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Start the hook scope for one top-level command.
    pub fn session(&self) -> HookSession<'_> {
        HookSession {
            hooks: self,
            before_ran: Cell::new(false),
            after_ran: Cell::new(false),
            depth: Cell::new(0),
        }
    }

    // Hook failures are logged and otherwise ignored.
    fn run(&self, name: &str, command: &str) {
        tracing::debug!(hook = name, command, "running hook");
        match self.runner.run_shell(command, Some(&self.cwd), true) {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::warn!(hook = name, command, code = ?status.code(), "hook exited with failure");
            }
            Err(err) => {
                tracing::warn!(hook = name, command, error = %err, "hook could not be started");
            }
        }
    }
}

/// Per-command hook scope. `before` and `after` each run at most once for the lifetime
/// of the session, however many wrapped operations are nested inside it.
pub struct HookSession<'a> {
    hooks: &'a Hooks,
    before_ran: Cell<bool>,
    after_ran: Cell<bool>,
    depth: Cell<usize>,
}

impl<'a> HookSession<'a> {
    pub fn before(&self) {
        if self.before_ran.replace(true) {
            return;
        }
        if let Some(command) = self.hooks.commands.before.as_deref() {
            self.hooks.run("before", command);
        }
    }

    pub fn after(&self) {
        if self.after_ran.replace(true) {
            return;
        }
        if let Some(command) = self.hooks.commands.after.as_deref() {
            self.hooks.run("after", command);
        }
    }

    /// Runs `before` and returns a guard that runs `after` once the outermost guard drops.
    pub fn enter(&self) -> HookGuard<'_, 'a> {
        self.before();
        self.depth.set(self.depth.get() + 1);
        HookGuard { session: self }
    }

    pub fn wrap<T>(&self, work: impl FnOnce() -> T) -> T {
        let _guard = self.enter();
        work()
    }

    /// Run the configured sync command in place of before/after; without one, fall back to
    /// running `before` then `after`.
    pub fn sync(&self) {
        match self.hooks.commands.sync.as_deref() {
            Some(command) => {
                self.before_ran.set(true);
                self.after_ran.set(true);
                self.hooks.run("sync", command);
            }
            None => {
                self.before();
                self.after();
            }
        }
    }
}

pub struct HookGuard<'s, 'a> {
    session: &'s HookSession<'a>,
}

impl Drop for HookGuard<'_, '_> {
    fn drop(&mut self) {
        let depth = self.session.depth.get().saturating_sub(1);
        self.session.depth.set(depth);
        if depth == 0 {
            self.session.after();
        }
    }
}
