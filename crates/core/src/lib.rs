//! Shared building blocks for the on-call engine: the error taxonomy,
//! environment-driven limits, UTC time windows and timezone lookup.

pub mod config;
pub mod error;
pub mod timezone;
pub mod window;

pub use chrono_tz::Tz;
pub use config::OncallConfig;
pub use error::*;
pub use timezone::{IanaTimezones, TimezoneLookup};
pub use window::TimeWindow;
