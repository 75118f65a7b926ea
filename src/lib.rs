//! tt - Task Tracker Library
//!
//! This library provides the core functionality for the tt CLI tool:
//! standalone tasks, epics with derived state, and subtasks, all sharing one
//! id space and one schedule.
//!
//! # Core Concepts
//!
//! - **Tasks**: Standalone work items with an optional scheduling window
//! - **Epics**: Containers whose status and window are derived from subtasks
//! - **Subtasks**: Children of exactly one epic
//! - **Schedule index**: Time-ordered view of all scheduled items, rejecting
//!   windows that strictly overlap an existing one
//! - **History**: De-duplicated recency list of recently viewed items
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.tt.toml`
//! - `error`: Error types and result aliases
//! - `model`: Entity types and epic aggregation
//! - `schedule`: Scheduling windows and the overlap index
//! - `history`: Recency history with O(1) record/forget
//! - `store`: The task store orchestrating maps, index, and history
//! - `storage`: CSV persistence for the store
//! - `lock`: File locking and atomic writes for the data file

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod lock;
pub mod model;
pub mod output;
pub mod schedule;
pub mod storage;
pub mod store;

pub use error::{Error, Result};
