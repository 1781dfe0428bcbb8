//! [`ShiftIter`]: the lazy walk over nominal shifts or active windows.

use chrono::{DateTime, Utc};
use oncall_core::{OncallError, Result};
use tracing::warn;

use crate::active_period::ActivePeriod;
use crate::rotation::Shift;

use super::generator::ShiftGenerator;

/// Lazily yields the shifts of one rotation inside `[lower, upper)`.
///
/// Yields `Err(ShiftLimitExceeded)` once when more than `max_shifts` shifts
/// would be produced and then ends.
pub struct ShiftIter<'g> {
    generator: &'g ShiftGenerator<'g>,
    lower: DateTime<Utc>,
    upper: DateTime<Utc>,
    /// Next nominal shift, when there is no active period.
    index: u64,
    /// Where to look for the next active window.
    resume: Option<DateTime<Utc>>,
    emitted: usize,
    done: bool,
}

impl<'g> ShiftIter<'g> {
    pub(super) fn new(
        generator: &'g ShiftGenerator<'g>,
        lower: DateTime<Utc>,
        upper: DateTime<Utc>,
        first_index: u64,
    ) -> Self {
        Self {
            generator,
            lower,
            upper,
            index: first_index,
            resume: None,
            emitted: 0,
            done: lower >= upper,
        }
    }

    /// Next non-empty shift, ignoring the cap.
    fn next_shift(&mut self) -> Option<Result<Shift>> {
        match self.generator.rotation.active_period.as_ref() {
            Some(period) => self.next_window(period),
            None => self.next_nominal(),
        }
    }

    fn next_nominal(&mut self) -> Option<Result<Shift>> {
        let generator = self.generator;
        loop {
            let nominal_start = generator.nominal_start(self.index)?;
            if nominal_start >= self.upper {
                return None;
            }
            let index = self.index;
            self.index += 1;

            let starts_at = nominal_start.max(self.lower);
            let ends_at = generator.nominal_end(nominal_start).min(self.upper);
            if starts_at >= ends_at {
                continue;
            }
            return Some(generator.roster.at(index).map(|p| Shift {
                participant: p.clone(),
                starts_at,
                ends_at,
            }));
        }
    }

    /// One shift per contiguous active window overlapping the range.
    fn next_window(&mut self, period: &ActivePeriod) -> Option<Result<Shift>> {
        let generator = self.generator;
        loop {
            let from = self.resume.unwrap_or(self.lower);
            if from >= self.upper {
                return None;
            }
            let (opens, closes) = period.window_from(from, generator.tz)?;
            if opens >= self.upper {
                return None;
            }
            self.resume = Some(closes);

            match generator.window_shift(opens, closes) {
                Ok(Some(mut shift)) => {
                    shift.starts_at = shift.starts_at.max(self.lower);
                    shift.ends_at = shift.ends_at.min(self.upper);
                    if shift.starts_at < shift.ends_at {
                        return Some(Ok(shift));
                    }
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl Iterator for ShiftIter<'_> {
    type Item = Result<Shift>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_shift() {
            Some(Ok(shift)) => {
                if self.emitted == self.generator.max_shifts {
                    warn!(
                        rotation_id = %self.generator.rotation.id,
                        limit = self.generator.max_shifts,
                        "shift limit exceeded"
                    );
                    self.done = true;
                    return Some(Err(OncallError::ShiftLimitExceeded {
                        limit: self.generator.max_shifts,
                    }));
                }
                self.emitted += 1;
                Some(Ok(shift))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

impl std::iter::FusedIterator for ShiftIter<'_> {}
