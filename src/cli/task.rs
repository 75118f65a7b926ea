//! `tt task` subcommands.

use std::path::PathBuf;

use crate::error::Result;
use crate::model::{Task, TaskStatus};
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{format_window, parse_schedule, StoreContext};

pub struct AddOptions {
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
    let mut task = Task::new(opts.title, opts.description, status, schedule);
    let id = store.add_task(task.clone())?;
    task.id = id;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Added task {id}"));
    human.push_summary("title", &task.title);
    human.push_summary("status", task.status.to_string());
    human.push_summary("window", format_window(&task.schedule));
    emit_success(opts.options, "task add", &task, Some(&human))
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
    let mut task = Task::new(opts.title, opts.description, status, schedule);
    task.id = opts.id;
    let task = store.update_task(task)?;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated task {}", task.id));
    human.push_summary("title", &task.title);
    human.push_summary("status", task.status.to_string());
    human.push_summary("window", format_window(&task.schedule));
    emit_success(opts.options, "task update", &task, Some(&human))
}

pub fn run_show(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let task = store.task(id)?;
    // The read lands in history, which persists in the sidecar.
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Task {id}: {}", task.title));
    human.push_summary("status", task.status.to_string());
    human.push_summary("window", format_window(&task.schedule));
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }
    emit_success(options, "task show", &task, Some(&human))
}

pub fn run_ls(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let tasks = store.tasks();

    let mut human = HumanOutput::new(format!("Tasks: {}", tasks.len()));
    for task in &tasks {
        human.push_detail(format!(
            "{} [{}] {} ({})",
            task.id,
            task.status,
            task.title,
            format_window(&task.schedule)
        ));
    }
    emit_success(options, "task ls", &tasks, Some(&human))
}

pub fn run_rm(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    store.delete_task(id)?;
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted task {id}"));
    emit_success(options, "task rm", &id, Some(&human))
}

pub fn run_clear(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let removed = store.tasks().len();
    store.delete_all_tasks();
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted {removed} task(s)"));
    emit_success(options, "task clear", &removed, Some(&human))
}
