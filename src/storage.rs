//! CSV persistence for the task store.
//!
//! One row per entity: `id,type,name,status,description,start,duration,epic`,
//! always eight columns, empty where a field does not apply. Start times use
//! the `dd.mm.yyyy hh:mm` display format and durations are whole minutes.
//! The format does not escape commas, so titles and descriptions must not
//! contain them.
//!
//! Loading restores tasks and epics first, then attaches subtasks, so a
//! parent epic always exists before its children; epic status and window are
//! re-derived during restore rather than read back from the file. The id
//! allocator resumes above the highest id seen.

use std::path::Path;

use crate::error::{Error, Result};
use crate::lock;
use crate::model::{Epic, Subtask, Task, TaskKind, TaskStatus};
use crate::schedule::{Schedule, DATE_TIME_FORMAT};
use crate::store::TaskStore;

pub const CSV_HEADER: &str = "id,type,name,status,description,start,duration,epic";

/// Write the whole store to `path`, atomically and under the file lock.
pub fn save(path: impl AsRef<Path>, store: &TaskStore, lock_timeout_ms: u64) -> Result<()> {
    let mut lines = vec![CSV_HEADER.to_string()];

    for task in store.tasks() {
        lines.push(task_row(&task));
    }
    for epic in store.epics() {
        lines.push(epic_row(&epic));
    }
    for sub in store.subtasks() {
        lines.push(subtask_row(&sub));
    }

    let mut data = lines.join("\n");
    data.push('\n');
    lock::write_atomic_locked(&path, data.as_bytes(), lock_timeout_ms)?;
    save_history(&path, store, lock_timeout_ms)
}

/// History lives in a sidecar file, one id per line, oldest access first, so
/// the recency view survives across CLI invocations.
fn history_path(path: impl AsRef<Path>) -> std::path::PathBuf {
    let path = path.as_ref();
    std::path::PathBuf::from(format!("{}.history", path.display()))
}

fn save_history(path: impl AsRef<Path>, store: &TaskStore, lock_timeout_ms: u64) -> Result<()> {
    let mut ids = store.history_ids();
    ids.reverse(); // snapshot is newest-first; persist in replay order
    let mut data = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    if !data.is_empty() {
        data.push('\n');
    }
    lock::write_atomic_locked(history_path(path), data.as_bytes(), lock_timeout_ms)
}

fn load_history(path: impl AsRef<Path>, store: &mut TaskStore, lock_timeout_ms: u64) -> Result<()> {
    let sidecar = history_path(path);
    if !sidecar.exists() {
        return Ok(());
    }
    let data = lock::read_locked(&sidecar, lock_timeout_ms)?;
    let text = String::from_utf8(data)
        .map_err(|_| Error::Csv("history file is not valid UTF-8".to_string()))?;
    let ids = text.lines().filter_map(|line| line.trim().parse().ok());
    store.restore_history(ids);
    Ok(())
}

/// Load a store from `path`. A missing file yields an empty store.
pub fn load(path: impl AsRef<Path>, lock_timeout_ms: u64) -> Result<TaskStore> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(TaskStore::new());
    }

    let data = lock::read_locked(path, lock_timeout_ms)?;
    let text = String::from_utf8(data)
        .map_err(|_| Error::Csv("data file is not valid UTF-8".to_string()))?;

    let mut rows = Vec::new();
    for line in text.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(line)?);
    }

    let mut store = TaskStore::new();

    // Tasks and epics first so every subtask's parent is resolvable.
    for row in &rows {
        match row.kind {
            TaskKind::Task => store.restore_task(row.to_task())?,
            TaskKind::Epic => store.restore_epic(row.to_epic())?,
            TaskKind::Subtask => {}
        }
    }
    for row in &rows {
        if row.kind == TaskKind::Subtask {
            store.restore_subtask(row.to_subtask()?).map_err(|_| {
                Error::Csv(format!(
                    "subtask {} references missing epic {}",
                    row.id,
                    row.epic_id.unwrap_or(0)
                ))
            })?;
        }
    }

    load_history(path, &mut store, lock_timeout_ms)?;
    Ok(store)
}

fn task_row(task: &Task) -> String {
    format!(
        "{},{},{},{},{},{},{},",
        task.id,
        TaskKind::Task.as_tag(),
        task.title,
        task.status,
        task.description,
        schedule_start(&task.schedule),
        schedule_minutes(&task.schedule),
    )
}

fn epic_row(epic: &Epic) -> String {
    format!(
        "{},{},{},{},{},,,",
        epic.id,
        TaskKind::Epic.as_tag(),
        epic.title,
        epic.status,
        epic.description,
    )
}

fn subtask_row(sub: &Subtask) -> String {
    format!(
        "{},{},{},{},{},{},{},{}",
        sub.id,
        TaskKind::Subtask.as_tag(),
        sub.title,
        sub.status,
        sub.description,
        schedule_start(&sub.schedule),
        schedule_minutes(&sub.schedule),
        sub.epic_id,
    )
}

fn schedule_start(schedule: &Option<Schedule>) -> String {
    schedule
        .as_ref()
        .map(|s| s.format_start())
        .unwrap_or_default()
}

fn schedule_minutes(schedule: &Option<Schedule>) -> String {
    schedule
        .as_ref()
        .map(|s| s.minutes.to_string())
        .unwrap_or_default()
}

struct Row {
    id: u32,
    kind: TaskKind,
    title: String,
    status: TaskStatus,
    description: String,
    schedule: Option<Schedule>,
    epic_id: Option<u32>,
}

impl Row {
    fn to_task(&self) -> Task {
        let mut task = Task::new(
            self.title.clone(),
            self.description.clone(),
            self.status,
            self.schedule,
        );
        task.id = self.id;
        task
    }

    fn to_epic(&self) -> Epic {
        let mut epic = Epic::new(self.title.clone(), self.description.clone());
        epic.id = self.id;
        epic
    }

    fn to_subtask(&self) -> Result<Subtask> {
        let epic_id = self
            .epic_id
            .ok_or_else(|| Error::Csv(format!("subtask {} is missing its epic id", self.id)))?;
        let mut sub = Subtask::new(
            self.title.clone(),
            self.description.clone(),
            self.status,
            self.schedule,
        );
        sub.id = self.id;
        sub.epic_id = epic_id;
        Ok(sub)
    }
}

fn parse_row(line: &str) -> Result<Row> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != 8 {
        return Err(Error::Csv(format!(
            "expected 8 columns, found {}: {line}",
            fields.len()
        )));
    }

    let id: u32 = fields[0]
        .parse()
        .map_err(|_| Error::Csv(format!("invalid id '{}'", fields[0])))?;
    let kind = TaskKind::from_tag(fields[1])
        .ok_or_else(|| Error::Csv(format!("unknown entity type '{}'", fields[1])))?;
    let status: TaskStatus = fields[3]
        .parse()
        .map_err(|_| Error::Csv(format!("invalid status '{}'", fields[3])))?;

    let schedule = match (fields[5], fields[6]) {
        ("", "") => None,
        (start, minutes) => {
            let start = chrono::NaiveDateTime::parse_from_str(start, DATE_TIME_FORMAT)
                .map_err(|_| Error::Csv(format!("invalid start time '{start}'")))?;
            let minutes: i64 = minutes
                .parse()
                .map_err(|_| Error::Csv(format!("invalid duration '{minutes}'")))?;
            Some(Schedule::new(start, minutes))
        }
    };

    let epic_id = match fields[7] {
        "" => None,
        raw => Some(
            raw.parse()
                .map_err(|_| Error::Csv(format!("invalid epic id '{raw}'")))?,
        ),
    };

    Ok(Row {
        id,
        kind,
        title: fields[2].to_string(),
        status,
        description: fields[4].to_string(),
        schedule,
        epic_id,
    })
}
