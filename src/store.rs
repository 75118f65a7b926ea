//! The task store: entity maps, schedule index, and history.
//!
//! `TaskStore` is the only surface other subsystems talk to; the schedule
//! index and history are internal collaborators it owns exclusively. Every
//! mutating operation is all-or-nothing: validation and the overlap check run
//! before any map, index, or history mutation, so a failed operation leaves
//! the store untouched. Deletes are the deliberate exception to `NotFound` —
//! deleting an unknown id is an idempotent no-op.
//!
//! Accessors hand out owned clones, never references into the maps, so
//! callers cannot corrupt derived state behind the store's back.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::history::History;
use crate::model::{Epic, Item, Subtask, Task, TaskKind};
use crate::schedule::{Entry, Schedule, ScheduleIndex};

/// Allocates ids from a single monotonically increasing counter shared by
/// tasks, epics, and subtasks. Owned by the store rather than process-wide,
/// so separate store instances get independent sequences.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Ensure future allocations land above `id`. Used when restoring
    /// persisted entities that already carry ids.
    pub fn bump_past(&mut self, id: u32) {
        self.next = self.next.max(id.saturating_add(1));
    }

    pub fn next_id(&self) -> u32 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: HashMap<u32, Task>,
    epics: HashMap<u32, Epic>,
    subtasks: HashMap<u32, Subtask>,
    index: ScheduleIndex,
    history: History,
    ids: IdAllocator,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
            epics: HashMap::new(),
            subtasks: HashMap::new(),
            index: ScheduleIndex::new(),
            history: History::new(),
            ids: IdAllocator::new(),
        }
    }

    // =========================================================================
    // Tasks
    // =========================================================================

    /// Add a standalone task, assigning its id. Windowed tasks are checked
    /// against the schedule index first and rejected on conflict.
    pub fn add_task(&mut self, mut task: Task) -> Result<u32> {
        self.check_window(0, &task.schedule)?;

        let id = self.ids.allocate();
        task.id = id;
        if let Some(schedule) = task.schedule {
            self.index.insert(Entry {
                id,
                kind: TaskKind::Task,
                schedule,
            });
        }
        self.tasks.insert(id, task);
        Ok(id)
    }

    /// Replace an existing task. The overlap check excludes the task's own
    /// prior window.
    pub fn update_task(&mut self, task: Task) -> Result<Task> {
        require_valid_id(task.id, TaskKind::Task)?;
        if !self.tasks.contains_key(&task.id) {
            return Err(Error::not_found(TaskKind::Task, task.id));
        }
        self.check_window(task.id, &task.schedule)?;

        self.index.remove(task.id);
        if let Some(schedule) = task.schedule {
            self.index.insert(Entry {
                id: task.id,
                kind: TaskKind::Task,
                schedule,
            });
        }
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    /// Fetch a task by id, recording the access in history.
    pub fn task(&mut self, id: u32) -> Result<Task> {
        require_valid_id(id, TaskKind::Task)?;
        let task = self
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(TaskKind::Task, id))?;
        self.history.record(id);
        Ok(task)
    }

    /// All standalone tasks, ordered by id.
    pub fn tasks(&self) -> Vec<Task> {
        let mut tasks: Vec<Task> = self.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| task.id);
        tasks
    }

    /// Delete a task; unknown ids are a no-op.
    pub fn delete_task(&mut self, id: u32) -> Result<()> {
        require_valid_id(id, TaskKind::Task)?;
        if self.tasks.remove(&id).is_some() {
            self.index.remove(id);
            self.history.forget(id);
        }
        Ok(())
    }

    pub fn delete_all_tasks(&mut self) {
        for id in self.tasks.keys() {
            self.index.remove(*id);
            self.history.forget(*id);
        }
        self.tasks.clear();
    }

    // =========================================================================
    // Epics
    // =========================================================================

    /// Add an epic, assigning its id. Caller-supplied status, window, and
    /// subtask set are ignored; a new epic always starts empty.
    pub fn add_epic(&mut self, mut epic: Epic) -> Result<u32> {
        let id = self.ids.allocate();
        epic.id = id;
        epic.subtask_ids.clear();
        epic.reaggregate(&[]);
        self.epics.insert(id, epic);
        Ok(id)
    }

    /// Replace an epic's own fields (title, description). Derived status and
    /// window and the subtask set are carried over from the stored epic and
    /// immediately re-aggregated.
    pub fn update_epic(&mut self, epic: Epic) -> Result<Epic> {
        require_valid_id(epic.id, TaskKind::Epic)?;
        let stored = self
            .epics
            .get(&epic.id)
            .ok_or_else(|| Error::not_found(TaskKind::Epic, epic.id))?;

        let mut updated = epic;
        updated.subtask_ids = stored.subtask_ids.clone();
        let id = updated.id;
        self.epics.insert(id, updated);
        self.reaggregate_epic(id);

        Ok(self.epics[&id].clone())
    }

    /// Fetch an epic by id, recording the access in history.
    pub fn epic(&mut self, id: u32) -> Result<Epic> {
        require_valid_id(id, TaskKind::Epic)?;
        let epic = self
            .epics
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(TaskKind::Epic, id))?;
        self.history.record(id);
        Ok(epic)
    }

    /// All epics, ordered by id.
    pub fn epics(&self) -> Vec<Epic> {
        let mut epics: Vec<Epic> = self.epics.values().cloned().collect();
        epics.sort_by_key(|epic| epic.id);
        epics
    }

    /// The subtasks of one epic, ordered by id.
    pub fn epic_subtasks(&self, epic_id: u32) -> Result<Vec<Subtask>> {
        require_valid_id(epic_id, TaskKind::Epic)?;
        let epic = self
            .epics
            .get(&epic_id)
            .ok_or_else(|| Error::not_found(TaskKind::Epic, epic_id))?;
        Ok(self.children_of(epic).into_iter().cloned().collect())
    }

    /// Delete an epic, cascading to every child subtask. Unknown ids are a
    /// no-op.
    pub fn delete_epic(&mut self, id: u32) -> Result<()> {
        require_valid_id(id, TaskKind::Epic)?;
        let Some(epic) = self.epics.remove(&id) else {
            return Ok(());
        };

        for sub_id in &epic.subtask_ids {
            self.subtasks.remove(sub_id);
            self.index.remove(*sub_id);
            self.history.forget(*sub_id);
        }
        self.history.forget(id);
        Ok(())
    }

    /// Delete every epic; their subtasks go with them.
    pub fn delete_all_epics(&mut self) {
        for id in self.subtasks.keys() {
            self.index.remove(*id);
            self.history.forget(*id);
        }
        self.subtasks.clear();
        for id in self.epics.keys() {
            self.history.forget(*id);
        }
        self.epics.clear();
    }

    // =========================================================================
    // Subtasks
    // =========================================================================

    /// Add a subtask under `epic_id`, assigning its id and re-aggregating the
    /// parent. The epic must already exist.
    pub fn add_subtask(&mut self, mut subtask: Subtask, epic_id: u32) -> Result<u32> {
        require_valid_id(epic_id, TaskKind::Epic)?;
        if !self.epics.contains_key(&epic_id) {
            return Err(Error::not_found(TaskKind::Epic, epic_id));
        }
        self.check_window(0, &subtask.schedule)?;

        let id = self.ids.allocate();
        subtask.id = id;
        subtask.epic_id = epic_id;
        if let Some(schedule) = subtask.schedule {
            self.index.insert(Entry {
                id,
                kind: TaskKind::Subtask,
                schedule,
            });
        }
        self.subtasks.insert(id, subtask);
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.subtask_ids.insert(id);
        }
        self.reaggregate_epic(epic_id);
        Ok(id)
    }

    /// Replace an existing subtask. The parent link always comes from the
    /// stored subtask; callers cannot move a subtask between epics.
    pub fn update_subtask(&mut self, mut subtask: Subtask) -> Result<Subtask> {
        require_valid_id(subtask.id, TaskKind::Subtask)?;
        let epic_id = self
            .subtasks
            .get(&subtask.id)
            .ok_or_else(|| Error::not_found(TaskKind::Subtask, subtask.id))?
            .epic_id;
        self.check_window(subtask.id, &subtask.schedule)?;

        subtask.epic_id = epic_id;
        self.index.remove(subtask.id);
        if let Some(schedule) = subtask.schedule {
            self.index.insert(Entry {
                id: subtask.id,
                kind: TaskKind::Subtask,
                schedule,
            });
        }
        self.subtasks.insert(subtask.id, subtask.clone());
        self.reaggregate_epic(epic_id);
        Ok(subtask)
    }

    /// Fetch a subtask by id, recording the access in history.
    pub fn subtask(&mut self, id: u32) -> Result<Subtask> {
        require_valid_id(id, TaskKind::Subtask)?;
        let subtask = self
            .subtasks
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(TaskKind::Subtask, id))?;
        self.history.record(id);
        Ok(subtask)
    }

    /// All subtasks, ordered by id.
    pub fn subtasks(&self) -> Vec<Subtask> {
        let mut subtasks: Vec<Subtask> = self.subtasks.values().cloned().collect();
        subtasks.sort_by_key(|sub| sub.id);
        subtasks
    }

    /// Delete a subtask and re-aggregate its parent. Unknown ids are a no-op.
    pub fn delete_subtask(&mut self, id: u32) -> Result<()> {
        require_valid_id(id, TaskKind::Subtask)?;
        let Some(subtask) = self.subtasks.remove(&id) else {
            return Ok(());
        };

        self.index.remove(id);
        self.history.forget(id);
        if let Some(epic) = self.epics.get_mut(&subtask.epic_id) {
            epic.subtask_ids.remove(&id);
        }
        self.reaggregate_epic(subtask.epic_id);
        Ok(())
    }

    /// Delete every subtask; epics stay but collapse back to their
    /// empty-subtask state (NEW, no window).
    pub fn delete_all_subtasks(&mut self) {
        for id in self.subtasks.keys() {
            self.index.remove(*id);
            self.history.forget(*id);
        }
        self.subtasks.clear();

        let epic_ids: Vec<u32> = self.epics.keys().copied().collect();
        for id in epic_ids {
            if let Some(epic) = self.epics.get_mut(&id) {
                epic.subtask_ids.clear();
            }
            self.reaggregate_epic(id);
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Scheduled tasks and subtasks in ascending start order. Epics are never
    /// indexed, so they never appear here.
    pub fn prioritized(&self) -> Vec<Item> {
        self.index
            .snapshot()
            .into_iter()
            .filter_map(|entry| match entry.kind {
                TaskKind::Task => self.tasks.get(&entry.id).cloned().map(Item::Task),
                TaskKind::Subtask => self.subtasks.get(&entry.id).cloned().map(Item::Subtask),
                TaskKind::Epic => None,
            })
            .collect()
    }

    /// Recently retrieved entities, most recent first, resolved to their
    /// current values.
    pub fn history(&self) -> Vec<Item> {
        self.history
            .snapshot()
            .into_iter()
            .filter_map(|id| self.lookup(id))
            .collect()
    }

    // =========================================================================
    // Restore (persistence loader surface)
    // =========================================================================

    /// Re-insert a persisted task that already carries its id. The allocator
    /// is bumped past the id so future allocations stay unique.
    pub fn restore_task(&mut self, task: Task) -> Result<()> {
        require_restored_id(task.id, TaskKind::Task)?;
        if let Some(schedule) = task.schedule {
            self.index.insert(Entry {
                id: task.id,
                kind: TaskKind::Task,
                schedule,
            });
        }
        self.ids.bump_past(task.id);
        self.tasks.insert(task.id, task);
        Ok(())
    }

    /// Re-insert a persisted epic. Children attach through
    /// [`TaskStore::restore_subtask`], which re-derives status and window.
    pub fn restore_epic(&mut self, mut epic: Epic) -> Result<()> {
        require_restored_id(epic.id, TaskKind::Epic)?;
        epic.subtask_ids.clear();
        epic.reaggregate(&[]);
        self.ids.bump_past(epic.id);
        self.epics.insert(epic.id, epic);
        Ok(())
    }

    /// Re-insert a persisted subtask. Its epic must have been restored first.
    pub fn restore_subtask(&mut self, subtask: Subtask) -> Result<()> {
        require_restored_id(subtask.id, TaskKind::Subtask)?;
        let epic_id = subtask.epic_id;
        if !self.epics.contains_key(&epic_id) {
            return Err(Error::not_found(TaskKind::Epic, epic_id));
        }
        if let Some(schedule) = subtask.schedule {
            self.index.insert(Entry {
                id: subtask.id,
                kind: TaskKind::Subtask,
                schedule,
            });
        }
        self.ids.bump_past(subtask.id);
        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.subtask_ids.insert(subtask.id);
        }
        self.subtasks.insert(subtask.id, subtask);
        self.reaggregate_epic(epic_id);
        Ok(())
    }

    /// History ids, most recent first. Used by the persistence collaborator;
    /// [`TaskStore::history`] resolves them to entities.
    pub fn history_ids(&self) -> Vec<u32> {
        self.history.snapshot()
    }

    /// Replay persisted history accesses, oldest first. Ids that no longer
    /// resolve to an entity are skipped.
    pub fn restore_history<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u32>,
    {
        for id in ids {
            if self.lookup(id).is_some() {
                self.history.record(id);
            }
        }
    }

    /// The id the allocator will hand out next.
    pub fn next_id(&self) -> u32 {
        self.ids.next_id()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn lookup(&self, id: u32) -> Option<Item> {
        if let Some(task) = self.tasks.get(&id) {
            return Some(Item::Task(task.clone()));
        }
        if let Some(epic) = self.epics.get(&id) {
            return Some(Item::Epic(epic.clone()));
        }
        self.subtasks.get(&id).map(|sub| Item::Subtask(sub.clone()))
    }

    fn children_of<'a>(&'a self, epic: &Epic) -> Vec<&'a Subtask> {
        let children: Vec<&Subtask> = epic
            .subtask_ids
            .iter()
            .filter_map(|id| self.subtasks.get(id))
            .collect();
        // A subtask listed by an epic but missing from the map is a store
        // bug, not a recoverable condition.
        debug_assert_eq!(children.len(), epic.subtask_ids.len());
        children
    }

    fn reaggregate_epic(&mut self, epic_id: u32) {
        let Some(epic) = self.epics.get(&epic_id) else {
            return;
        };
        let mut probe = epic.clone();
        let children = self.children_of(epic);
        probe.reaggregate(&children);
        let (status, window) = (probe.status, probe.window);

        if let Some(epic) = self.epics.get_mut(&epic_id) {
            epic.status = status;
            epic.window = window;
        }
    }

    fn check_window(&self, candidate_id: u32, schedule: &Option<Schedule>) -> Result<()> {
        let Some(schedule) = schedule else {
            return Ok(());
        };
        if schedule.minutes < 1 {
            return Err(Error::InvalidArgument(
                "scheduling window duration must be at least one minute".to_string(),
            ));
        }
        if self.index.overlaps(candidate_id, schedule) {
            return Err(Error::ScheduleConflict {
                start: schedule.format_start(),
                minutes: schedule.minutes,
            });
        }
        Ok(())
    }
}

fn require_valid_id(id: u32, kind: TaskKind) -> Result<()> {
    if id < 1 {
        return Err(Error::InvalidArgument(format!(
            "{kind} id must be at least 1"
        )));
    }
    Ok(())
}

fn require_restored_id(id: u32, kind: TaskKind) -> Result<()> {
    if id < 1 {
        return Err(Error::InvalidArgument(format!(
            "restored {kind} must carry an assigned id"
        )));
    }
    Ok(())
}
