use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OncallError {
    #[error("Invalid range: end {end} must be after start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid time format '{0}', expected HH:MM (00:00-23:59)")]
    InvalidTimeFormat(String),

    #[error("Rotation length must be a positive integer, got {0}")]
    InvalidLength(u32),

    #[error("Participant '{0}' is listed more than once")]
    DuplicateParticipant(String),

    #[error("Rotation has no active participants")]
    EmptyRoster,

    #[error("Shift limit of {limit} exceeded, narrow the requested time window")]
    ShiftLimitExceeded { limit: usize },

    #[error("A rotation may have at most {max} participants, got {got}")]
    MaximumParticipants { max: usize, got: usize },

    #[error("Active period start and end must differ, got {0}")]
    EmptyActivePeriod(String),

    #[error("Restricted shift times are not available for hourly shifts")]
    IncompatibleActivePeriod,

    #[error("Escalation policy has no rules")]
    EmptyRuleSet,

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, OncallError>;
