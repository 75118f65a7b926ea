//! `tt subtask` subcommands.

use std::path::PathBuf;

use crate::error::Result;
use crate::model::{Subtask, TaskStatus};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{format_window, parse_schedule, StoreContext};

pub struct AddOptions {
    pub epic: u32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub start: Option<String>,
    pub duration: Option<i64>,
    pub file: Option<PathBuf>,
    pub options: OutputOptions,
}

pub fn run_add(opts: AddOptions) -> Result<()> {
    let status: TaskStatus = opts.status.parse()?;
    let schedule = parse_schedule(opts.start.as_deref(), opts.duration)?;
    let ctx = StoreContext::resolve(opts.file);

    let mut store = ctx.load()?;
    let mut subtask = Subtask::new(opts.title, opts.description, status, schedule);
    let id = store.add_subtask(subtask.clone(), opts.epic)?;
    subtask.id = id;
    subtask.epic_id = opts.epic;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Added subtask {id} to epic {}", opts.epic));
    human.push_summary("title", &subtask.title);
    human.push_summary("status", subtask.status.to_string());
    human.push_summary("window", format_window(&subtask.schedule));
    emit_success(opts.options, "subtask add", &subtask, Some(&human))
}

pub struct UpdateOptions {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub start: Option<String>,
    pub duration: Option<i64>,
    pub file: Option<PathBuf>,
    pub options: OutputOptions,
}

pub fn run_update(opts: UpdateOptions) -> Result<()> {
    let status: TaskStatus = opts.status.parse()?;
    let schedule = parse_schedule(opts.start.as_deref(), opts.duration)?;
    let ctx = StoreContext::resolve(opts.file);

    let mut store = ctx.load()?;
    let mut subtask = Subtask::new(opts.title, opts.description, status, schedule);
    subtask.id = opts.id;
    let subtask = store.update_subtask(subtask)?;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated subtask {}", subtask.id));
    human.push_summary("title", &subtask.title);
    human.push_summary("status", subtask.status.to_string());
    human.push_summary("window", format_window(&subtask.schedule));
    human.push_summary("epic", subtask.epic_id.to_string());
    emit_success(opts.options, "subtask update", &subtask, Some(&human))
}

pub fn run_show(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let subtask = store.subtask(id)?;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Subtask {id}: {}", subtask.title));
    human.push_summary("status", subtask.status.to_string());
    human.push_summary("window", format_window(&subtask.schedule));
    human.push_summary("epic", subtask.epic_id.to_string());
    if !subtask.description.is_empty() {
        human.push_detail(subtask.description.clone());
    }
    emit_success(options, "subtask show", &subtask, Some(&human))
}

pub fn run_ls(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let subtasks = store.subtasks();

    let mut human = HumanOutput::new(format!("Subtasks: {}", subtasks.len()));
    for sub in &subtasks {
        human.push_detail(format!(
            "{} [{}] {} (epic {}, {})",
            sub.id,
            sub.status,
            sub.title,
            sub.epic_id,
            format_window(&sub.schedule)
        ));
    }
    emit_success(options, "subtask ls", &subtasks, Some(&human))
}

pub fn run_rm(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    store.delete_subtask(id)?;
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted subtask {id}"));
    emit_success(options, "subtask rm", &id, Some(&human))
}

pub fn run_clear(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let removed = store.subtasks().len();
    store.delete_all_subtasks();
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted {removed} subtask(s)"));
    emit_success(options, "subtask clear", &removed, Some(&human))
}
