//! YAML loading for schedules and escalation policies.
//!
//! Single documents load through [`load_schedule`] / [`load_policy`];
//! [`ScheduleLoader`] scans a directory tree and keeps every schedule that
//! parsed, reporting per-file outcomes without aborting the scan.

mod core;
mod error;


pub use self::core::{load_policy, load_schedule, parse_policy, parse_schedule, ScheduleLoader};
pub use self::error::{LoadError, LoadResult, LoadStatus, Result};
