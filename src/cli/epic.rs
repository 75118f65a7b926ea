//! `tt epic` subcommands.

use std::path::PathBuf;

use crate::error::Result;
use crate::model::Epic;
use crate::output::{emit_success, HumanOutput, OutputOptions};

use super::{format_window, StoreContext};

fn window_summary(epic: &Epic) -> String {
    match &epic.window {
        Some(w) => format!(
            "{} +{}m (ends {})",
            w.start.format(crate::schedule::DATE_TIME_FORMAT),
            w.minutes,
            w.end.format(crate::schedule::DATE_TIME_FORMAT)
        ),
        None => "unscheduled".to_string(),
    }
}

pub struct AddOptions {
    pub title: String,
    pub description: String,
    pub file: Option<PathBuf>,
    pub options: OutputOptions,
}

pub fn run_add(opts: AddOptions) -> Result<()> {
    let ctx = StoreContext::resolve(opts.file);
    let mut store = ctx.load()?;
    let mut epic = Epic::new(opts.title, opts.description);
    let id = store.add_epic(epic.clone())?;
    epic.id = id;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Added epic {id}"));
    human.push_summary("title", &epic.title);
    human.push_summary("status", epic.status.to_string());
    emit_success(opts.options, "epic add", &epic, Some(&human))
}

pub struct UpdateOptions {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub file: Option<PathBuf>,
    pub options: OutputOptions,
}

pub fn run_update(opts: UpdateOptions) -> Result<()> {
    let ctx = StoreContext::resolve(opts.file);
    let mut store = ctx.load()?;
    let mut epic = Epic::new(opts.title, opts.description);
    epic.id = opts.id;
    let epic = store.update_epic(epic)?;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Updated epic {}", epic.id));
    human.push_summary("title", &epic.title);
    human.push_summary("status", epic.status.to_string());
    human.push_summary("subtasks", epic.subtask_ids.len().to_string());
    emit_success(opts.options, "epic update", &epic, Some(&human))
}

pub fn run_show(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let epic = store.epic(id)?;
    ctx.save(&store)?;

    let mut human = HumanOutput::new(format!("Epic {id}: {}", epic.title));
    human.push_summary("status", epic.status.to_string());
    human.push_summary("window", window_summary(&epic));
    human.push_summary("subtasks", epic.subtask_ids.len().to_string());
    if !epic.description.is_empty() {
        human.push_detail(epic.description.clone());
    }
    emit_success(options, "epic show", &epic, Some(&human))
}

pub fn run_ls(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let epics = store.epics();

    let mut human = HumanOutput::new(format!("Epics: {}", epics.len()));
    for epic in &epics {
        human.push_detail(format!(
            "{} [{}] {} ({}, {} subtask(s))",
            epic.id,
            epic.status,
            epic.title,
            window_summary(epic),
            epic.subtask_ids.len()
        ));
    }
    emit_success(options, "epic ls", &epics, Some(&human))
}

pub fn run_subtasks(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let store = ctx.load()?;
    let subtasks = store.epic_subtasks(id)?;

    let mut human = HumanOutput::new(format!("Subtasks of epic {id}: {}", subtasks.len()));
    for sub in &subtasks {
        human.push_detail(format!(
            "{} [{}] {} ({})",
            sub.id,
            sub.status,
            sub.title,
            format_window(&sub.schedule)
        ));
    }
    emit_success(options, "epic subtasks", &subtasks, Some(&human))
}

pub fn run_rm(id: u32, file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    store.delete_epic(id)?;
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted epic {id} and its subtasks"));
    emit_success(options, "epic rm", &id, Some(&human))
}

pub fn run_clear(file: Option<PathBuf>, options: OutputOptions) -> Result<()> {
    let ctx = StoreContext::resolve(file);
    let mut store = ctx.load()?;
    let removed = store.epics().len();
    store.delete_all_epics();
    ctx.save(&store)?;

    let human = HumanOutput::new(format!("Deleted {removed} epic(s) and their subtasks"));
    emit_success(options, "epic clear", &removed, Some(&human))
}
