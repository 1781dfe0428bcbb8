//! [`ShiftGenerator`], the per-rotation entry point for shift computation.

use chrono::{DateTime, Duration, Utc};
use oncall_core::{OncallError, Result, TimeWindow, Tz};
use tracing::debug;

use crate::active_period::ActivePeriod;
use crate::roster::ParticipantRoster;
use crate::rotation::{Rotation, Shift};

use super::iter::ShiftIter;

/// Computes shifts for one rotation in one timezone.
///
/// Holds no mutable state: every call to [`shifts`](ShiftGenerator::shifts)
/// starts a fresh walk, so repeated calls with the same window yield the
/// same sequence.
#[derive(Debug, Clone)]
pub struct ShiftGenerator<'a> {
    pub(super) rotation: &'a Rotation,
    pub(super) roster: ParticipantRoster,
    pub(super) tz: Tz,
    pub(super) max_shifts: usize,
    pub(super) cycle_secs: i64,
}

impl<'a> ShiftGenerator<'a> {
    /// Build a generator; fails on a zero length, an empty active period or
    /// a duplicated participant.
    pub fn new(rotation: &'a Rotation, tz: Tz, max_shifts: usize) -> Result<Self> {
        if rotation.length == 0 {
            return Err(OncallError::InvalidLength(rotation.length));
        }
        if let Some(period) = rotation.active_period.filter(ActivePeriod::is_empty) {
            return Err(OncallError::EmptyActivePeriod(period.to_string()));
        }
        let roster = ParticipantRoster::build(rotation.participants.clone())?;
        Ok(Self {
            rotation,
            roster,
            tz,
            max_shifts,
            cycle_secs: rotation.shift_duration().num_seconds(),
        })
    }

    pub fn rotation(&self) -> &Rotation {
        self.rotation
    }

    pub fn roster(&self) -> &ParticipantRoster {
        &self.roster
    }

    /// Lazily walk the shifts overlapping `window`.
    ///
    /// Fails up front with `EmptyRoster` when nobody is left to assign.
    pub fn shifts(&self, window: &TimeWindow) -> Result<ShiftIter<'_>> {
        if self.roster.is_empty() {
            return Err(OncallError::EmptyRoster);
        }

        let lower = window.start().max(self.rotation.starts_at);
        let upper = match self.rotation.ends_at {
            Some(ends_at) => window.end().min(ends_at),
            None => window.end(),
        };
        let first_index = self.index_at(lower);

        debug!(
            rotation_id = %self.rotation.id,
            window = %window,
            first_index,
            "generating shifts"
        );

        Ok(ShiftIter::new(self, lower, upper, first_index))
    }

    /// Collect every shift overlapping `window`.
    pub fn generate(&self, window: &TimeWindow) -> Result<Vec<Shift>> {
        self.shifts(window)?.collect()
    }

    /// The shift covering `instant`, if the rotation is active then.
    ///
    /// Unlike [`shifts`](Self::shifts) the result is not clipped to a query
    /// window. With an active period it spans the whole active window.
    pub fn shift_at(&self, instant: DateTime<Utc>) -> Result<Option<Shift>> {
        if instant < self.rotation.starts_at {
            return Ok(None);
        }
        if matches!(self.rotation.ends_at, Some(ends_at) if instant >= ends_at) {
            return Ok(None);
        }

        if let Some(period) = &self.rotation.active_period {
            return match period.window_containing(instant, self.tz) {
                Some((opens, closes)) => self.window_shift(opens, closes),
                None => Ok(None),
            };
        }

        let index = self.index_at(instant);
        let Some(starts_at) = self.nominal_start(index) else {
            return Ok(None);
        };
        let mut ends_at = self.nominal_end(starts_at);
        if let Some(rotation_end) = self.rotation.ends_at {
            ends_at = ends_at.min(rotation_end);
        }
        Ok(Some(Shift {
            participant: self.roster.at(index)?.clone(),
            starts_at,
            ends_at,
        }))
    }

    /// One active window as a shift, clipped to the rotation's lifetime.
    ///
    /// The window belongs to the nominal shift holding its last instant, so
    /// the owner does not depend on the query window.
    pub(super) fn window_shift(
        &self,
        opens: DateTime<Utc>,
        closes: DateTime<Utc>,
    ) -> Result<Option<Shift>> {
        let starts_at = opens.max(self.rotation.starts_at);
        let ends_at = match self.rotation.ends_at {
            Some(rotation_end) => closes.min(rotation_end),
            None => closes,
        };
        if starts_at >= ends_at {
            return Ok(None);
        }
        let owner = self.index_at(ends_at - Duration::nanoseconds(1));
        Ok(Some(Shift {
            participant: self.roster.at(owner)?.clone(),
            starts_at,
            ends_at,
        }))
    }

    /// Index of the nominal shift containing `instant` (0 before `starts_at`).
    pub(super) fn index_at(&self, instant: DateTime<Utc>) -> u64 {
        let elapsed = (instant - self.rotation.starts_at).num_seconds();
        if elapsed <= 0 {
            0
        } else {
            (elapsed / self.cycle_secs) as u64
        }
    }

    pub(super) fn nominal_start(&self, index: u64) -> Option<DateTime<Utc>> {
        let offset = i64::try_from(index).ok()?.checked_mul(self.cycle_secs)?;
        self.rotation
            .starts_at
            .checked_add_signed(Duration::try_seconds(offset)?)
    }

    /// End of the nominal shift starting at `start`; saturates at the latest
    /// representable instant.
    pub(super) fn nominal_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        Duration::try_seconds(self.cycle_secs)
            .and_then(|cycle| start.checked_add_signed(cycle))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
