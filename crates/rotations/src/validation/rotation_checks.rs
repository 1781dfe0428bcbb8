//! Rotation mutation checks: roster size, duplicates, active period, ranges.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use oncall_core::{OncallConfig, OncallError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::active_period::{parse_hhmm, ActivePeriodInput};
use crate::roster::Participant;
use crate::rotation::{LengthUnit, Rotation};

use super::{ValidationResult, ViolationCode};

/// A proposed rotation create/update, before anything is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationPayload {
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub length: u32,
    pub length_unit: LengthUnit,
    #[serde(default)]
    pub active_period: Option<ActivePeriodInput>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl From<&Rotation> for RotationPayload {
    fn from(rotation: &Rotation) -> Self {
        Self {
            starts_at: rotation.starts_at,
            ends_at: rotation.ends_at,
            length: rotation.length,
            length_unit: rotation.length_unit,
            active_period: rotation.active_period.map(Into::into),
            participants: rotation.participants.clone(),
        }
    }
}

/// Validates [`RotationPayload`]s against a participant cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationMutationValidator {
    max_participants: usize,
}

impl RotationMutationValidator {
    pub fn new(max_participants: usize) -> Self {
        Self { max_participants }
    }

    pub fn from_config(config: &OncallConfig) -> Self {
        Self::new(config.max_participants)
    }

    /// Run every check and collect all violations.
    pub fn validate(&self, payload: &RotationPayload) -> ValidationResult {
        let mut result = ValidationResult::new();

        if payload.length == 0 {
            result.error(
                ViolationCode::InvalidLength,
                "length",
                OncallError::InvalidLength(payload.length).to_string(),
            );
        }

        self.validate_participants(&payload.participants, &mut result);
        validate_active_period(payload, &mut result);

        if let Some(ends_at) = payload.ends_at {
            if ends_at <= payload.starts_at {
                let err = OncallError::InvalidRange {
                    start: payload.starts_at,
                    end: ends_at,
                };
                result.error(ViolationCode::InvalidRange, "ends_at", err.to_string());
            }
        }

        if payload.participants.iter().all(|p| p.removed) {
            result.warn(
                "participants",
                "Rotation has no active participants; no shifts will be generated",
            );
        }

        debug!(
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated rotation payload"
        );
        result
    }

    fn validate_participants(&self, participants: &[Participant], result: &mut ValidationResult) {
        if participants.len() > self.max_participants {
            result.error(
                ViolationCode::MaximumParticipants,
                "participants",
                OncallError::MaximumParticipants {
                    max: self.max_participants,
                    got: participants.len(),
                }
                .to_string(),
            );
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for (i, p) in participants.iter().enumerate() {
            if !seen.insert(&p.user) && reported.insert(&p.user) {
                result.error(
                    ViolationCode::DuplicateParticipant,
                    format!("participants[{i}].user"),
                    OncallError::DuplicateParticipant(p.user.to_string()).to_string(),
                );
            }
        }
    }
}

fn validate_active_period(payload: &RotationPayload, result: &mut ValidationResult) {
    let Some(period) = &payload.active_period else {
        return;
    };

    if payload.length_unit == LengthUnit::Hours {
        result.error(
            ViolationCode::IncompatibleActivePeriod,
            "active_period",
            OncallError::IncompatibleActivePeriod.to_string(),
        );
    }

    let start = parse_hhmm(&period.start_time);
    let end = parse_hhmm(&period.end_time);
    for (field, parsed, raw) in [
        ("start_time", &start, &period.start_time),
        ("end_time", &end, &period.end_time),
    ] {
        if parsed.is_err() {
            result.error(
                ViolationCode::InvalidTimeFormat,
                format!("active_period.{field}"),
                OncallError::InvalidTimeFormat(raw.to_string()).to_string(),
            );
        }
    }

    if let (Ok(start), Ok(end)) = (start, end) {
        if start == end {
            let raw = format!("{}-{}", period.start_time, period.end_time);
            result.error(
                ViolationCode::InvalidRange,
                "active_period",
                OncallError::EmptyActivePeriod(raw).to_string(),
            );
        }
    }
}
