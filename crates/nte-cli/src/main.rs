mod prompt;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nte_core::config::{load_config, NteConfig};
use nte_core::events::{events_key, read_events, record_event};
use nte_core::hooks::Hooks;
use nte_core::journal::{note_that, random_line, today_key};
use nte_core::listing::{list_all, list_recent};
use nte_core::shell::{editor_argv, search_argv, SearchTool, ShellRunner, SystemShell};
use nte_core::store::NoteStore;
use nte_core::todo::{add_task, clear_completed, complete_task, remove_task, DEFAULT_TODO_KEY};

#[derive(Parser)]
#[command(name = "nte", version, about = "Notes, todos and events stored as plain files")]
struct Cli {
    /// Path to the JSON config file (defaults to $NTE_CONFIG or ~/.nte_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Store VALUE under KEY
    Set {
        key: String,
        value: String,
        /// Replace an existing note without asking
        #[arg(long)]
        overwrite: bool,
    },
    /// Print the note stored under KEY
    Get { key: String },
    /// Open KEY in an editor
    Edit {
        key: String,
        #[arg(long)]
        using: Option<String>,
    },
    /// Append VALUE to KEY
    More {
        key: String,
        value: String,
        #[arg(long, default_value = "\n")]
        sep: String,
    },
    /// Append VALUE to today's note
    That { value: String },
    /// Open today's note in an editor
    Book {
        #[arg(long)]
        using: Option<String>,
    },
    /// Print today's note
    Today,
    /// Print a random line from KEY
    Random { key: String },
    /// Add an open checklist item
    Todo {
        task: String,
        #[arg(long, default_value = DEFAULT_TODO_KEY)]
        key: String,
    },
    /// Mark a checklist item done
    Done {
        task: String,
        #[arg(long, default_value = DEFAULT_TODO_KEY)]
        key: String,
        /// Create the item first when it does not exist
        #[arg(long)]
        create: bool,
    },
    /// Drop all completed checklist items
    ClearDone {
        #[arg(long, default_value = DEFAULT_TODO_KEY)]
        key: String,
    },
    /// Remove a checklist item
    TodoRemove {
        task: String,
        #[arg(long, default_value = DEFAULT_TODO_KEY)]
        key: String,
    },
    /// Print the checklist
    Todos {
        #[arg(long, default_value = DEFAULT_TODO_KEY)]
        key: String,
    },
    /// Run the note stored under KEY as a shell command
    Run { key: String },
    /// Show the most recent notes with a short preview
    Recent {
        #[arg(long, default_value_t = 10)]
        amount: usize,
        #[arg(long, default_value_t = 3)]
        lines: usize,
    },
    /// List all notes, most recent first
    Ls,
    /// Record a timestamped event for KEY
    Event {
        key: String,
        #[arg(long, default_value = "")]
        details: String,
    },
    /// Print events recorded for KEY, latest first
    Events { key: String },
    /// Open the event log for KEY in an editor
    EditEvents {
        key: String,
        #[arg(long)]
        using: Option<String>,
    },
    /// Delete the note stored under KEY
    Delete { key: String },
    /// Search notes with grep
    Grep { text: String },
    /// Search notes with ripgrep
    Rg { text: String },
    /// Run the configured sync hook
    Sync,
    /// Print version information
    Version,
}

struct App {
    config: NteConfig,
    store: NoteStore,
    hooks: Hooks,
    shell: SystemShell,
}

impl App {
    fn load(config_path: Option<&std::path::Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let store = NoteStore::open(&config.notes_dir)
            .with_context(|| format!("opening notes dir {}", config.notes_dir.display()))?;
        let hooks = Hooks::from_config(&config);
        tracing::debug!(notes_dir = %config.notes_dir.display(), "opened note store");
        Ok(Self {
            config,
            store,
            hooks,
            shell: SystemShell,
        })
    }

    fn print_note(&self, key: &str) -> Result<()> {
        println!("{}", self.store.read(key)?);
        Ok(())
    }

    fn edit(&self, key: &str, using: Option<&str>) -> Result<ExitCode> {
        let editor = using.unwrap_or(&self.config.editor);
        let argv = editor_argv(editor, &self.store.path_for(key)?)?;
        let status = self.shell.run_argv(&argv, None)?;
        Ok(exit_code(status))
    }

    fn run(&self, command: Command) -> Result<ExitCode> {
        let session = self.hooks.session();
        match command {
            Command::Set {
                key,
                value,
                overwrite,
            } => session.wrap(|| -> Result<ExitCode> {
                let overwrite = overwrite
                    || (self.store.exists(&key)
                        && prompt::confirm(&format!("Replace existing note for {}.", key))?);
                self.store.write(&key, &value, overwrite)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Get { key } => session.wrap(|| -> Result<ExitCode> {
                self.print_note(&key)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Edit { key, using } => session.wrap(|| self.edit(&key, using.as_deref())),
            Command::More { key, value, sep } => session.wrap(|| -> Result<ExitCode> {
                self.store.append(&key, &value, &sep)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::That { value } => session.wrap(|| -> Result<ExitCode> {
                note_that(&self.store, &value)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Book { using } => {
                session.wrap(|| self.edit(&today_key(), using.as_deref()))
            }
            Command::Today => session.wrap(|| -> Result<ExitCode> {
                self.print_note(&today_key())?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Random { key } => session.wrap(|| -> Result<ExitCode> {
                let text = self.store.read(&key)?;
                if let Some(line) = random_line(&text, &mut rand::thread_rng()) {
                    println!("{}", line);
                }
                Ok(ExitCode::SUCCESS)
            }),
            Command::Todo { task, key } => session.wrap(|| -> Result<ExitCode> {
                add_task(&self.store, &key, &task)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Done { task, key, create } => session.wrap(|| -> Result<ExitCode> {
                complete_task(&self.store, &key, &task, create)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::ClearDone { key } => session.wrap(|| -> Result<ExitCode> {
                clear_completed(&self.store, &key)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::TodoRemove { task, key } => session.wrap(|| -> Result<ExitCode> {
                remove_task(&self.store, &key, &task)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Todos { key } => {
                session.before();
                self.print_note(&key)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Run { key } => session.wrap(|| -> Result<ExitCode> {
                let command = self.store.read(&key)?;
                self.store.mark_executable(&key)?;
                let status = self.shell.run_shell(&command, None, false)?;
                Ok(exit_code(status))
            }),
            Command::Recent { amount, lines } => {
                session.before();
                let width = render::terminal_width();
                for note in list_recent(&self.store, amount, lines)? {
                    for line in render::render_preview(&note, width) {
                        println!("{}", line);
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Ls => {
                session.before();
                for entry in list_all(&self.store)? {
                    println!("{}", render::render_entry(&entry));
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Event { key, details } => session.wrap(|| -> Result<ExitCode> {
                record_event(&self.store, &key, &details)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Events { key } => {
                session.before();
                for line in read_events(&self.store, &key)? {
                    println!("{}", line);
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::EditEvents { key, using } => {
                session.wrap(|| self.edit(&events_key(&key), using.as_deref()))
            }
            Command::Delete { key } => session.wrap(|| -> Result<ExitCode> {
                self.store.delete(&key)?;
                Ok(ExitCode::SUCCESS)
            }),
            Command::Grep { text } => session.wrap(|| self.search(SearchTool::Grep, &text)),
            Command::Rg { text } => session.wrap(|| self.search(SearchTool::Ripgrep, &text)),
            Command::Sync => {
                session.sync();
                Ok(ExitCode::SUCCESS)
            }
            Command::Version => {
                print_version();
                Ok(ExitCode::SUCCESS)
            }
        }
    }

    fn search(&self, tool: SearchTool, text: &str) -> Result<ExitCode> {
        let argv = search_argv(tool, text, self.store.root())?;
        let status = self.shell.run_argv(&argv, None)?;
        Ok(exit_code(status))
    }
}

fn print_version() {
    println!("nte {}", nte_core::version());
}

fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };
    if let Command::Version = command {
        print_version();
        return ExitCode::SUCCESS;
    }

    let result = App::load(cli.config.as_deref()).and_then(|app| app.run(command));
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}
