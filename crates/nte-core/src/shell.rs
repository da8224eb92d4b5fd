use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid command {0:?}")]
    InvalidCommand(String),
    #[error("{0} not found on PATH")]
    MissingBinary(String),
}

/// Launches external processes and waits for them to finish.
pub trait ShellRunner {
    /// Run `command` through the platform shell. With `quiet`, stdout and stderr are discarded.
    fn run_shell(&self, command: &str, cwd: Option<&Path>, quiet: bool)
        -> Result<ExitStatus, ShellError>;

    /// Run an argument vector directly, inheriting the terminal.
    fn run_argv(&self, argv: &[String], cwd: Option<&Path>) -> Result<ExitStatus, ShellError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl ShellRunner for SystemShell {
    fn run_shell(
        &self,
        command: &str,
        cwd: Option<&Path>,
        quiet: bool,
    ) -> Result<ExitStatus, ShellError> {
        let mut cmd = shell_command(command);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        cmd.status().map_err(|source| ShellError::Spawn {
            command: command.to_string(),
            source,
        })
    }

    fn run_argv(&self, argv: &[String], cwd: Option<&Path>) -> Result<ExitStatus, ShellError> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| ShellError::InvalidCommand(String::new()))?;
        let mut cmd = Command::new(program);
        cmd.args(args);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        cmd.status().map_err(|source| ShellError::Spawn {
            command: argv.join(" "),
            source,
        })
    }
}

#[cfg(unix)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(not(unix))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

/// Split an editor command such as `code --wait` and append the file to open.
pub fn editor_argv(editor: &str, path: &Path) -> Result<Vec<String>, ShellError> {
    let mut argv =
        shell_words::split(editor).map_err(|_| ShellError::InvalidCommand(editor.to_string()))?;
    if argv.is_empty() {
        return Err(ShellError::InvalidCommand(editor.to_string()));
    }
    argv.push(path.to_string_lossy().to_string());
    Ok(argv)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTool {
    Grep,
    Ripgrep,
}

impl SearchTool {
    fn binary(self) -> &'static str {
        match self {
            SearchTool::Grep => "grep",
            SearchTool::Ripgrep => "rg",
        }
    }
}

/// Build the argument vector for a case-insensitive recursive grep, or a ripgrep search,
/// over the notes root.
pub fn search_argv(tool: SearchTool, text: &str, root: &Path) -> Result<Vec<String>, ShellError> {
    let binary: PathBuf = match tool {
        SearchTool::Grep => PathBuf::from(tool.binary()),
        SearchTool::Ripgrep => which::which(tool.binary())
            .map_err(|_| ShellError::MissingBinary(tool.binary().to_string()))?,
    };
    let mut argv = vec![binary.to_string_lossy().to_string()];
    if tool == SearchTool::Grep {
        argv.push("-Ri".to_string());
    }
    argv.push(text.to_string());
    argv.push(root.to_string_lossy().to_string());
    Ok(argv)
}
