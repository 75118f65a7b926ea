//! Command-line interface for tt
//!
//! This module defines the CLI structure using clap derive macros.
//! Each entity family is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::Item;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::schedule::{Schedule, DATE_TIME_FORMAT};
use crate::storage;
use crate::store::TaskStore;

mod epic;
mod subtask;
mod task;

/// tt - task tracker
///
/// Tracks standalone tasks, epics, and subtasks with scheduling windows,
/// rejecting windows that overlap an already scheduled item.
#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the data file (defaults to `.tt.toml` or tracker.csv)
    #[arg(long, global = true, env = "TT_FILE")]
    pub file: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Standalone task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Epic management
    #[command(subcommand)]
    Epic(EpicCommands),

    /// Subtask management
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// List scheduled items in start-time order
    Prioritized,

    /// Show recently viewed items, most recent first
    History,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a new task
    Add {
        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status: NEW, IN_PROGRESS, or DONE
        #[arg(long, default_value = "NEW")]
        status: String,

        /// Window start, e.g. "24.08.2026 10:00" (requires --duration)
        #[arg(long)]
        start: Option<String>,

        /// Window duration in minutes (requires --start)
        #[arg(long)]
        duration: Option<i64>,
    },

    /// Replace an existing task
    Update {
        /// Task id
        id: u32,

        /// Task title
        title: String,

        /// Task description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status: NEW, IN_PROGRESS, or DONE
        #[arg(long, default_value = "NEW")]
        status: String,

        /// Window start (requires --duration)
        #[arg(long)]
        start: Option<String>,

        /// Window duration in minutes (requires --start)
        #[arg(long)]
        duration: Option<i64>,
    },

    /// Show a task by id
    Show {
        /// Task id
        id: u32,
    },

    /// List all tasks
    Ls,

    /// Delete a task (no-op if the id is unknown)
    Rm {
        /// Task id
        id: u32,
    },

    /// Delete every task
    Clear,
}

/// Epic subcommands
#[derive(Subcommand, Debug)]
pub enum EpicCommands {
    /// Add a new epic (status and window are derived from its subtasks)
    Add {
        /// Epic title
        title: String,

        /// Epic description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Rename an epic; derived fields and subtasks are preserved
    Update {
        /// Epic id
        id: u32,

        /// Epic title
        title: String,

        /// Epic description
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Show an epic by id
    Show {
        /// Epic id
        id: u32,
    },

    /// List all epics
    Ls,

    /// List an epic's subtasks
    Subtasks {
        /// Epic id
        id: u32,
    },

    /// Delete an epic and all of its subtasks
    Rm {
        /// Epic id
        id: u32,
    },

    /// Delete every epic (and every subtask with them)
    Clear,
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Add a new subtask under an epic
    Add {
        /// Parent epic id
        #[arg(long)]
        epic: u32,

        /// Subtask title
        title: String,

        /// Subtask description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status: NEW, IN_PROGRESS, or DONE
        #[arg(long, default_value = "NEW")]
        status: String,

        /// Window start (requires --duration)
        #[arg(long)]
        start: Option<String>,

        /// Window duration in minutes (requires --start)
        #[arg(long)]
        duration: Option<i64>,
    },

    /// Replace an existing subtask (its parent epic cannot change)
    Update {
        /// Subtask id
        id: u32,

        /// Subtask title
        title: String,

        /// Subtask description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Status: NEW, IN_PROGRESS, or DONE
        #[arg(long, default_value = "NEW")]
        status: String,

        /// Window start (requires --duration)
        #[arg(long)]
        start: Option<String>,

        /// Window duration in minutes (requires --start)
        #[arg(long)]
        duration: Option<i64>,
    },

    /// Show a subtask by id
    Show {
        /// Subtask id
        id: u32,
    },

    /// List all subtasks
    Ls,

    /// Delete a subtask (its epic is re-aggregated)
    Rm {
        /// Subtask id
        id: u32,
    },

    /// Delete every subtask, resetting all epics
    Clear,
}

/// Where the data file lives and how long to wait for its lock.
pub(crate) struct StoreContext {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl StoreContext {
    pub(crate) fn resolve(file: Option<PathBuf>) -> Self {
        let config = Config::load_from_dir(".");
        Self {
            path: file.unwrap_or(config.storage.file),
            lock_timeout_ms: config.storage.lock_timeout_ms,
        }
    }

    pub(crate) fn load(&self) -> Result<TaskStore> {
        storage::load(&self.path, self.lock_timeout_ms)
    }

    pub(crate) fn save(&self, store: &TaskStore) -> Result<()> {
        storage::save(&self.path, store, self.lock_timeout_ms)
    }
}

/// Combine the optional --start/--duration pair into a window.
pub(crate) fn parse_schedule(start: Option<&str>, duration: Option<i64>) -> Result<Option<Schedule>> {
    match (start, duration) {
        (None, None) => Ok(None),
        (Some(start), Some(minutes)) => {
            let start = chrono::NaiveDateTime::parse_from_str(start.trim(), DATE_TIME_FORMAT)
                .map_err(|_| {
                    Error::InvalidArgument(format!(
                        "invalid start '{start}': expected dd.mm.yyyy hh:mm"
                    ))
                })?;
            Ok(Some(Schedule::new(start, minutes)))
        }
        _ => Err(Error::InvalidArgument(
            "--start and --duration must be given together".to_string(),
        )),
    }
}

pub(crate) fn format_window(schedule: &Option<Schedule>) -> String {
    match schedule {
        Some(s) => format!("{} +{}m", s.format_start(), s.minutes),
        None => "unscheduled".to_string(),
    }
}

pub(crate) fn item_line(item: &Item) -> String {
    let window = match item {
        Item::Task(task) => format_window(&task.schedule),
        Item::Subtask(sub) => format_window(&sub.schedule),
        Item::Epic(epic) => match &epic.window {
            Some(w) => format!(
                "{} +{}m",
                w.start.format(crate::schedule::DATE_TIME_FORMAT),
                w.minutes
            ),
            None => "unscheduled".to_string(),
        },
    };
    format!(
        "{} {} [{}] {} ({window})",
        item.id(),
        item.kind(),
        item.status(),
        item.title()
    )
}

/// Run the prioritized listing
fn run_prioritized(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let items = store.prioritized();

    let mut human = HumanOutput::new(format!("Scheduled items: {}", items.len()));
    for item in &items {
        human.push_detail(item_line(item));
    }
    emit_success(options, "prioritized", &items, Some(&human))
}

/// Run the history listing
fn run_history(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let items = store.history();

    let mut human = HumanOutput::new(format!("Recently viewed: {}", items.len()));
    for item in &items {
        human.push_detail(item_line(item));
    }
    emit_success(options, "history", &items, Some(&human))
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let options = OutputOptions {
            json: self.json,
            quiet: self.quiet,
        };

        match self.command {
            Commands::Task(cmd) => match cmd {
                TaskCommands::Add {
                    title,
                    description,
                    status,
                    start,
                    duration,
                } => task::run_add(task::AddOptions {
                    title,
                    description,
                    status,
                    start,
                    duration,
                    file: self.file,
                    options,
                }),
                TaskCommands::Update {
                    id,
                    title,
                    description,
                    status,
                    start,
                    duration,
                } => task::run_update(task::UpdateOptions {
                    id,
                    title,
                    description,
                    status,
                    start,
                    duration,
                    file: self.file,
                    options,
                }),
                TaskCommands::Show { id } => task::run_show(id, self.file, options),
                TaskCommands::Ls => task::run_ls(self.file, options),
                TaskCommands::Rm { id } => task::run_rm(id, self.file, options),
                TaskCommands::Clear => task::run_clear(self.file, options),
            },
            Commands::Epic(cmd) => match cmd {
                EpicCommands::Add { title, description } => epic::run_add(epic::AddOptions {
                    title,
                    description,
                    file: self.file,
                    options,
                }),
                EpicCommands::Update {
                    id,
                    title,
                    description,
                } => epic::run_update(epic::UpdateOptions {
                    id,
                    title,
                    description,
                    file: self.file,
                    options,
                }),
                EpicCommands::Show { id } => epic::run_show(id, self.file, options),
                EpicCommands::Ls => epic::run_ls(self.file, options),
                EpicCommands::Subtasks { id } => epic::run_subtasks(id, self.file, options),
                EpicCommands::Rm { id } => epic::run_rm(id, self.file, options),
                EpicCommands::Clear => epic::run_clear(self.file, options),
            },
            Commands::Subtask(cmd) => match cmd {
                SubtaskCommands::Add {
                    epic,
                    title,
                    description,
                    status,
                    start,
                    duration,
                } => subtask::run_add(subtask::AddOptions {
                    epic,
                    title,
                    description,
                    status,
                    start,
                    duration,
                    file: self.file,
                    options,
                }),
                SubtaskCommands::Update {
                    id,
                    title,
                    description,
                    status,
                    start,
                    duration,
                } => subtask::run_update(subtask::UpdateOptions {
                    id,
                    title,
                    description,
                    status,
                    start,
                    duration,
                    file: self.file,
                    options,
                }),
                SubtaskCommands::Show { id } => subtask::run_show(id, self.file, options),
                SubtaskCommands::Ls => subtask::run_ls(self.file, options),
                SubtaskCommands::Rm { id } => subtask::run_rm(id, self.file, options),
                SubtaskCommands::Clear => subtask::run_clear(self.file, options),
            },
            Commands::Prioritized => run_prioritized(self.file, options),
            Commands::History => run_history(self.file, options),
        }
    }
}
