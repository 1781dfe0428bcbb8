//! Schedules: rotations that share a timezone.

use chrono::{DateTime, Utc};
use oncall_core::{Result, TimeWindow, TimezoneLookup, Tz};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rotation::{Rotation, Shift};
use crate::shifts::ShiftGenerator;

/// A named set of rotations evaluated in one IANA timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub rotations: Vec<Rotation>,
}

/// Who holds a rotation at a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCall {
    pub rotation_id: String,
    pub shift: Shift,
}

/// Shifts computed for one rotation of a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationShifts {
    pub rotation_id: String,
    pub shifts: Vec<Shift>,
}

impl Schedule {
    pub fn zone(&self, lookup: &impl TimezoneLookup) -> Result<Tz> {
        lookup.lookup(&self.timezone)
    }

    pub fn rotation(&self, id: &str) -> Option<&Rotation> {
        self.rotations.iter().find(|r| r.id == id)
    }

    /// Current shift of every rotation covering `instant`.
    ///
    /// Rotations with nobody left on the roster are skipped rather than
    /// failing the whole schedule.
    pub fn oncall_at(
        &self,
        instant: DateTime<Utc>,
        lookup: &impl TimezoneLookup,
        max_shifts: usize,
    ) -> Result<Vec<OnCall>> {
        let tz = self.zone(lookup)?;
        let mut oncall = Vec::new();
        for rotation in &self.rotations {
            let generator = ShiftGenerator::new(rotation, tz, max_shifts)?;
            if generator.roster().is_empty() {
                debug!(rotation_id = %rotation.id, "rotation has no active participants");
                continue;
            }
            if let Some(shift) = generator.shift_at(instant)? {
                oncall.push(OnCall {
                    rotation_id: rotation.id.clone(),
                    shift,
                });
            }
        }
        Ok(oncall)
    }

    /// Shifts of every rotation inside `window`, in schedule order.
    pub fn shifts(
        &self,
        window: &TimeWindow,
        lookup: &impl TimezoneLookup,
        max_shifts: usize,
    ) -> Result<Vec<RotationShifts>> {
        let tz = self.zone(lookup)?;
        self.rotations
            .iter()
            .map(|rotation| {
                let generator = ShiftGenerator::new(rotation, tz, max_shifts)?;
                Ok(RotationShifts {
                    rotation_id: rotation.id.clone(),
                    shifts: generator.generate(window)?,
                })
            })
            .collect()
    }
}
