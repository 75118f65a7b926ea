//! Entity model: tasks, epics, subtasks.
//!
//! Identity is the integer id assigned by the store; equality and hashing use
//! the id only, so two values with the same id are the same entity regardless
//! of their other fields. Constructors never assign ids; a freshly built
//! entity carries id 0 until the store allocates one.
//!
//! An epic's status and window are derived from its subtask set and are
//! recomputed by [`Epic::reaggregate`] after every subtask change. The epic
//! duration is the sum of subtask durations, not `end - start`; with
//! non-contiguous subtasks the two legitimately disagree, since duration
//! measures total scheduled work while start/end bound the wall-clock span.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schedule::Schedule;

/// Task progress state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    New,
    InProgress,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TaskStatus::New => "NEW",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        };
        f.write_str(tag)
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace('-', "_").as_str() {
            "NEW" => Ok(TaskStatus::New),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "DONE" => Ok(TaskStatus::Done),
            other => Err(Error::InvalidArgument(format!(
                "invalid status '{other}': must be NEW, IN_PROGRESS, or DONE"
            ))),
        }
    }
}

/// Which of the three entity kinds an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Task,
    Epic,
    Subtask,
}

impl TaskKind {
    /// Uppercase tag used in the data file (`TASK`, `EPIC`, `SUBTASK`).
    pub fn as_tag(&self) -> &'static str {
        match self {
            TaskKind::Task => "TASK",
            TaskKind::Epic => "EPIC",
            TaskKind::Subtask => "SUBTASK",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "TASK" => Some(TaskKind::Task),
            "EPIC" => Some(TaskKind::Epic),
            "SUBTASK" => Some(TaskKind::Subtask),
            _ => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Task => "task",
            TaskKind::Epic => "epic",
            TaskKind::Subtask => "subtask",
        };
        f.write_str(name)
    }
}

/// A standalone unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: TaskStatus,
        schedule: Option<Schedule>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            status,
            schedule,
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Derived window of an epic.
///
/// Kept separate from [`Schedule`] because `minutes` is the sum of subtask
/// durations while `end` is the latest subtask end, so `end` is not
/// `start + minutes` in general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicWindow {
    pub start: NaiveDateTime,
    pub minutes: i64,
    pub end: NaiveDateTime,
}

/// A container of subtasks; status and window are derived, never caller-set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Epic {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<EpicWindow>,
    pub subtask_ids: BTreeSet<u32>,
}

impl Epic {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: description.into(),
            status: TaskStatus::New,
            window: None,
            subtask_ids: BTreeSet::new(),
        }
    }

    /// Recompute status and window from the current subtask set.
    ///
    /// Total and idempotent: the same children always produce the same
    /// derived fields, and an empty set resets to NEW with no window.
    pub fn reaggregate(&mut self, children: &[&Subtask]) {
        self.status = derive_status(children.iter().map(|sub| sub.status));
        self.window = derive_window(children.iter().filter_map(|sub| sub.schedule.as_ref()));
    }
}

impl PartialEq for Epic {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Epic {}

impl Hash for Epic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A child of exactly one epic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: u32,
    pub epic_id: u32,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

impl Subtask {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        status: TaskStatus,
        schedule: Option<Schedule>,
    ) -> Self {
        Self {
            id: 0,
            epic_id: 0,
            title: title.into(),
            description: description.into(),
            status,
            schedule,
        }
    }
}

impl PartialEq for Subtask {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Subtask {}

impl Hash for Subtask {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Owned view of any entity, used by history and prioritized listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Item {
    Task(Task),
    Epic(Epic),
    Subtask(Subtask),
}

impl Item {
    pub fn id(&self) -> u32 {
        match self {
            Item::Task(task) => task.id,
            Item::Epic(epic) => epic.id,
            Item::Subtask(sub) => sub.id,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Item::Task(_) => TaskKind::Task,
            Item::Epic(_) => TaskKind::Epic,
            Item::Subtask(_) => TaskKind::Subtask,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Item::Task(task) => &task.title,
            Item::Epic(epic) => &epic.title,
            Item::Subtask(sub) => &sub.title,
        }
    }

    pub fn status(&self) -> TaskStatus {
        match self {
            Item::Task(task) => task.status,
            Item::Epic(epic) => epic.status,
            Item::Subtask(sub) => sub.status,
        }
    }
}

/// Epic status law: empty or all-NEW is NEW, non-empty all-DONE is DONE,
/// any other mix is IN_PROGRESS.
pub fn derive_status<I>(statuses: I) -> TaskStatus
where
    I: IntoIterator<Item = TaskStatus>,
{
    let mut seen_any = false;
    let mut all_new = true;
    let mut all_done = true;

    for status in statuses {
        seen_any = true;
        if status != TaskStatus::New {
            all_new = false;
        }
        if status != TaskStatus::Done {
            all_done = false;
        }
    }

    if !seen_any || all_new {
        TaskStatus::New
    } else if all_done {
        TaskStatus::Done
    } else {
        TaskStatus::InProgress
    }
}

/// Epic window law over windowed subtasks only: earliest start, summed
/// duration, latest end. Absent when no subtask carries a window.
pub fn derive_window<'a, I>(windows: I) -> Option<EpicWindow>
where
    I: IntoIterator<Item = &'a Schedule>,
{
    let mut derived: Option<EpicWindow> = None;

    for schedule in windows {
        let end = schedule.end();
        derived = Some(match derived {
            None => EpicWindow {
                start: schedule.start,
                minutes: schedule.minutes,
                end,
            },
            Some(window) => EpicWindow {
                start: window.start.min(schedule.start),
                minutes: window.minutes + schedule.minutes,
                end: window.end.max(end),
            },
        });
    }

    derived
}
