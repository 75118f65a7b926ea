//! Scheduling windows and the ordered schedule index.
//!
//! A [`Schedule`] is a (start, duration) pair; `end = start + duration`.
//! The [`ScheduleIndex`] holds every currently windowed task and subtask
//! (never epics), ordered by start time, and answers the overlap query the
//! store runs before accepting a windowed add or update.
//!
//! Two windows overlap only on strict interior intersection: windows that
//! merely touch at a boundary instant do not conflict.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::model::TaskKind;

/// Display format for start times, e.g. `24.08.2026 10:00`
pub const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// A scheduling window: start instant plus duration in whole minutes.
///
/// Both halves are always present; an unscheduled task carries
/// `Option<Schedule>::None` rather than a half-filled window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub start: NaiveDateTime,
    pub minutes: i64,
}

impl Schedule {
    pub fn new(start: NaiveDateTime, minutes: i64) -> Self {
        Self { start, minutes }
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(self.minutes)
    }

    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration()
    }

    /// Strict interior intersection; touching endpoints are not an overlap.
    pub fn overlaps(&self, other: &Schedule) -> bool {
        !(self.end() <= other.start || self.start >= other.end())
    }

    pub fn format_start(&self) -> String {
        self.start.format(DATE_TIME_FORMAT).to_string()
    }
}

/// A schedule index entry: which entity occupies the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub id: u32,
    pub kind: TaskKind,
    pub schedule: Schedule,
}

/// Ordered collection of all scheduled items, keyed by start time.
///
/// Ordering ties (identical starts) are broken by id, which is stable for a
/// given data set. The index does not check for duplicate ids on insert;
/// callers remove before re-inserting on update.
#[derive(Debug, Clone, Default)]
pub struct ScheduleIndex {
    entries: BTreeMap<(NaiveDateTime, u32), Entry>,
    starts: HashMap<u32, NaiveDateTime>,
}

impl ScheduleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: Entry) {
        self.starts.insert(entry.id, entry.schedule.start);
        self.entries.insert((entry.schedule.start, entry.id), entry);
    }

    /// Remove the entry for `id`; no-op if absent.
    pub fn remove(&mut self, id: u32) {
        if let Some(start) = self.starts.remove(&id) {
            self.entries.remove(&(start, id));
        }
    }

    /// Does `candidate` strictly overlap any entry other than `candidate_id`?
    ///
    /// `candidate_id` excludes an entity's own prior window during updates;
    /// pass 0 for a not-yet-assigned entity.
    pub fn overlaps(&self, candidate_id: u32, candidate: &Schedule) -> bool {
        self.entries
            .values()
            .filter(|entry| entry.id != candidate_id)
            .any(|entry| candidate.overlaps(&entry.schedule))
    }

    /// All entries, ascending by start time.
    pub fn snapshot(&self) -> Vec<Entry> {
        self.entries.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.starts.contains_key(&id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.starts.clear();
    }
}
