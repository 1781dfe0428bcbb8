//! On-call rotation engine.
//!
//! This crate provides:
//! - Rotations with a participant roster and an optional daily active period
//! - Lazy, DST-aware shift generation over a UTC window
//! - Escalation rule selection and pending escalation scheduling
//! - Batched validation of rotation mutations and escalation policies
//! - YAML loading of schedules and policies

pub mod active_period;
pub mod escalation;
pub mod loader;
pub mod roster;
pub mod rotation;
pub mod schedule;
pub mod shifts;
pub mod validation;

pub use active_period::ActivePeriod;
pub use escalation::{select_due_rule, AlertState, AlertStatus, EscalationPolicy, EscalationRule};
pub use roster::{Participant, ParticipantRoster, UserId};
pub use rotation::{LengthUnit, Rotation, Shift};
pub use schedule::{OnCall, RotationShifts, Schedule};
pub use shifts::{ShiftGenerator, ShiftIter};
pub use validation::{validate_policy, RotationMutationValidator, RotationPayload, ValidationResult};
