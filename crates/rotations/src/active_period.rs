//! Daily time-of-day restriction applied to a rotation.
//!
//! An [`ActivePeriod`] keeps shifts inside `[start_time, end_time)` local time.
//! When `end_time < start_time` the window wraps past midnight. All wall-clock
//! math goes through the rotation's IANA zone so DST gaps and overlaps move
//! the boundaries the way a clock on the wall would.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc,
};
use oncall_core::{OncallError, Result, Tz};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// `HH:MM`, 00:00 through 23:59.
static HHMM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid HH:MM pattern"));

/// A daily window, e.g. 08:00-17:00 or 22:00-06:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ActivePeriodInput", into = "ActivePeriodInput")]
pub struct ActivePeriod {
    start_time: NaiveTime,
    end_time: NaiveTime,
}

/// Unvalidated `HH:MM` pair as it arrives from callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePeriodInput {
    pub start_time: String,
    pub end_time: String,
}

impl TryFrom<ActivePeriodInput> for ActivePeriod {
    type Error = OncallError;

    fn try_from(input: ActivePeriodInput) -> Result<Self> {
        ActivePeriod::parse(&input.start_time, &input.end_time)
    }
}

impl From<ActivePeriod> for ActivePeriodInput {
    fn from(period: ActivePeriod) -> Self {
        Self {
            start_time: format_hhmm(period.start_time),
            end_time: format_hhmm(period.end_time),
        }
    }
}

impl ActivePeriod {
    /// Parse both bounds; each must match `^([01]\d|2[0-3]):[0-5]\d$`.
    pub fn parse(start_time: &str, end_time: &str) -> Result<Self> {
        Ok(Self {
            start_time: parse_hhmm(start_time)?,
            end_time: parse_hhmm(end_time)?,
        })
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end_time < self.start_time
    }

    /// Whether the window is empty (start equals end) and can never match.
    pub fn is_empty(&self) -> bool {
        self.end_time == self.start_time
    }

    /// Whether `instant`, read as local time in `tz`, falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>, tz: Tz) -> bool {
        let local = instant.with_timezone(&tz).time();
        if self.wraps_midnight() {
            local >= self.start_time || local < self.end_time
        } else {
            local >= self.start_time && local < self.end_time
        }
    }

    /// The earliest instant strictly after `instant` where [`contains`](Self::contains)
    /// flips. `None` when it never flips (empty window).
    pub fn next_boundary_after(&self, instant: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
        if self.is_empty() {
            return None;
        }

        let state = self.contains(instant, tz);
        let local_date = instant.with_timezone(&tz).date_naive();

        // A day either side covers offsets and skipped calendar days.
        let mut candidates: Vec<DateTime<Utc>> = (-1..=3)
            .filter_map(|d| local_date.checked_add_signed(Duration::days(d)))
            .flat_map(|day| {
                [self.start_time, self.end_time]
                    .into_iter()
                    .flat_map(move |t| occurrences(tz, day.and_time(t)))
            })
            .filter(|c| *c > instant)
            .collect();
        candidates.sort();
        candidates.dedup();

        candidates
            .into_iter()
            .find(|c| self.contains(*c, tz) != state)
    }

    /// The contiguous active window `[opens, closes)` holding `instant`.
    pub fn window_containing(
        &self,
        instant: DateTime<Utc>,
        tz: Tz,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if !self.contains(instant, tz) {
            return None;
        }
        let closes = self.next_boundary_after(instant, tz)?;

        // No window outlasts a local day plus a DST shift.
        let mut cursor = instant
            .checked_sub_signed(Duration::days(2))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut opens = cursor;
        while let Some(b) = self.next_boundary_after(cursor, tz) {
            if b > instant {
                break;
            }
            if self.contains(b, tz) {
                opens = b;
            }
            cursor = b;
        }
        Some((opens, closes))
    }

    /// The window holding `from`, or else the first one opening after it.
    pub fn window_from(
        &self,
        from: DateTime<Utc>,
        tz: Tz,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        if self.contains(from, tz) {
            return self.window_containing(from, tz);
        }
        let opens = self.next_boundary_after(from, tz)?;
        let closes = self.next_boundary_after(opens, tz)?;
        Some((opens, closes))
    }
}

impl std::fmt::Display for ActivePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}",
            format_hhmm(self.start_time),
            format_hhmm(self.end_time)
        )
    }
}

/// Containment with "no period" meaning always active.
pub fn is_active(period: Option<&ActivePeriod>, instant: DateTime<Utc>, tz: Tz) -> bool {
    period.map_or(true, |p| p.contains(instant, tz))
}

/// Next flip point, or `None` when there is no period to restrict by.
pub fn next_boundary(
    period: Option<&ActivePeriod>,
    instant: DateTime<Utc>,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    period.and_then(|p| p.next_boundary_after(instant, tz))
}

pub(crate) fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    let invalid = || OncallError::InvalidTimeFormat(s.to_string());
    let caps = HHMM.captures(s).ok_or_else(invalid)?;
    let hour: u32 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u32 = caps[2].parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

fn format_hhmm(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Every UTC instant at which the wall clock in `tz` reaches `local`.
///
/// Ambiguous times (fall-back) yield both occurrences plus the transition
/// between them, where the clock jumps back across `local`. Skipped times
/// (spring-forward) yield the transition instant that jumps over `local`.
fn occurrences(tz: Tz, local: NaiveDateTime) -> Vec<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => vec![t.with_timezone(&Utc)],
        LocalResult::Ambiguous(first, second) => {
            let first = first.with_timezone(&Utc);
            let second = second.with_timezone(&Utc);
            let offset_at_first = utc_offset(tz, first);
            let jump = first_instant(first, second, |x| utc_offset(tz, x) != offset_at_first);
            vec![first, jump, second]
        }
        LocalResult::None => {
            // local(lo) < `local` and local(hi) > `local` for any real offset (-12h..+14h).
            let as_utc = local.and_utc();
            let lo = as_utc - Duration::hours(15);
            let hi = as_utc + Duration::hours(13);
            vec![first_instant(lo, hi, |x| x.with_timezone(&tz).naive_local() >= local)]
        }
    }
}

fn utc_offset(tz: Tz, instant: DateTime<Utc>) -> i32 {
    tz.offset_from_utc_datetime(&instant.naive_utc())
        .fix()
        .local_minus_utc()
}

/// Smallest whole second in `(lo, hi]` where `pred` holds, given `!pred(lo)`
/// and `pred(hi)` with a single flip in between.
fn first_instant(
    lo: DateTime<Utc>,
    hi: DateTime<Utc>,
    pred: impl Fn(DateTime<Utc>) -> bool,
) -> DateTime<Utc> {
    let at = |secs: i64| DateTime::from_timestamp(secs, 0).unwrap_or(hi);
    let (mut lo_s, mut hi_s) = (lo.timestamp(), hi.timestamp());
    while hi_s - lo_s > 1 {
        let mid = lo_s + (hi_s - lo_s) / 2;
        if pred(at(mid)) {
            hi_s = mid;
        } else {
            lo_s = mid;
        }
    }
    at(hi_s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn period(start: &str, end: &str) -> ActivePeriod {
        ActivePeriod::parse(start, end).unwrap()
    }

    #[test]
    fn parses_valid_times() {
        let p = period("08:00", "17:30");
        assert_eq!(p.start_time(), NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(p.end_time(), NaiveTime::from_hms_opt(17, 30, 0).unwrap());
        assert_eq!(p.to_string(), "08:00-17:30");
        assert!(!p.wraps_midnight());
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["8:00", "24:00", "12:60", "ab:cd", "12-00", "", "12:000", " 12:00"] {
            assert_eq!(
                ActivePeriod::parse(bad, "10:00"),
                Err(OncallError::InvalidTimeFormat(bad.to_string())),
                "{bad:?} should be rejected"
            );
        }
        assert!(ActivePeriod::parse("00:00", "23:59").is_ok());
    }

    #[test]
    fn wrapping_window_contains_both_sides_of_midnight() {
        let p = period("22:00", "06:00");
        assert!(p.wraps_midnight());
        assert!(p.contains(utc("2020-01-10T23:30:00Z"), Tz::UTC));
        assert!(p.contains(utc("2020-01-11T02:00:00Z"), Tz::UTC));
        assert!(!p.contains(utc("2020-01-10T12:00:00Z"), Tz::UTC));
        assert!(!p.contains(utc("2020-01-11T06:00:00Z"), Tz::UTC));
        assert!(p.contains(utc("2020-01-10T22:00:00Z"), Tz::UTC));
    }

    #[test]
    fn containment_uses_local_time() {
        let p = period("09:00", "17:00");
        // 08:30 UTC is 09:30 in Berlin (CET, +1).
        assert!(p.contains(utc("2020-01-10T08:30:00Z"), Tz::Europe__Berlin));
        assert!(!p.contains(utc("2020-01-10T08:30:00Z"), Tz::UTC));
    }

    #[test]
    fn empty_window_never_contains_or_flips() {
        let p = period("09:00", "09:00");
        assert!(p.is_empty());
        assert!(!p.contains(utc("2020-01-10T09:00:00Z"), Tz::UTC));
        assert_eq!(p.next_boundary_after(utc("2020-01-10T09:00:00Z"), Tz::UTC), None);
    }

    #[test]
    fn next_boundary_same_day() {
        let p = period("08:00", "17:00");
        assert_eq!(
            p.next_boundary_after(utc("2020-01-10T06:00:00Z"), Tz::UTC),
            Some(utc("2020-01-10T08:00:00Z"))
        );
        assert_eq!(
            p.next_boundary_after(utc("2020-01-10T08:00:00Z"), Tz::UTC),
            Some(utc("2020-01-10T17:00:00Z"))
        );
        assert_eq!(
            p.next_boundary_after(utc("2020-01-10T17:00:00Z"), Tz::UTC),
            Some(utc("2020-01-11T08:00:00Z"))
        );
    }

    #[test]
    fn next_boundary_wraps_midnight() {
        let p = period("22:00", "06:00");
        assert_eq!(
            p.next_boundary_after(utc("2020-01-10T23:00:00Z"), Tz::UTC),
            Some(utc("2020-01-11T06:00:00Z"))
        );
        assert_eq!(
            p.next_boundary_after(utc("2020-01-11T06:00:00Z"), Tz::UTC),
            Some(utc("2020-01-11T22:00:00Z"))
        );
    }

    #[test]
    fn next_boundary_steps_over_spring_forward_gap() {
        // New York jumps 02:00 EST -> 03:00 EDT at 07:00Z on 2021-03-14,
        // so a 02:30 start never shows on the clock.
        let p = period("02:30", "06:00");
        let ny = Tz::America__New_York;
        let midnight = utc("2021-03-14T05:00:00Z");
        assert!(!p.contains(midnight, ny));

        let opens = p.next_boundary_after(midnight, ny).unwrap();
        assert_eq!(opens, utc("2021-03-14T07:00:00Z"));
        assert!(p.contains(opens, ny));

        // 06:00 EDT
        assert_eq!(
            p.next_boundary_after(opens, ny),
            Some(utc("2021-03-14T10:00:00Z"))
        );
    }

    #[test]
    fn next_boundary_handles_fall_back_repeat() {
        // New York repeats 01:00-02:00 on 2021-11-07: 01:30 EDT is 05:30Z,
        // the clock falls back at 06:00Z and 01:30 EST is 06:30Z.
        let p = period("01:30", "08:00");
        let ny = Tz::America__New_York;
        let mut cursor = utc("2021-11-07T04:00:00Z");
        let mut flips = Vec::new();
        for _ in 0..4 {
            cursor = p.next_boundary_after(cursor, ny).unwrap();
            flips.push((cursor, p.contains(cursor, ny)));
        }
        assert_eq!(
            flips,
            vec![
                (utc("2021-11-07T05:30:00Z"), true),
                (utc("2021-11-07T06:00:00Z"), false),
                (utc("2021-11-07T06:30:00Z"), true),
                (utc("2021-11-07T13:00:00Z"), false),
            ]
        );
    }

    #[test]
    fn window_containing_spans_midnight() {
        let p = period("22:00", "06:00");
        let w = (utc("2020-01-10T22:00:00Z"), utc("2020-01-11T06:00:00Z"));
        assert_eq!(p.window_containing(utc("2020-01-10T22:00:00Z"), Tz::UTC), Some(w));
        assert_eq!(p.window_containing(utc("2020-01-11T05:59:00Z"), Tz::UTC), Some(w));
        assert_eq!(p.window_containing(utc("2020-01-11T06:00:00Z"), Tz::UTC), None);
    }

    #[test]
    fn window_containing_across_fall_back() {
        // 01:30 EDT is 05:30Z; the repeated hour ends the window at 06:00Z.
        let p = period("01:30", "08:00");
        let ny = Tz::America__New_York;
        assert_eq!(
            p.window_containing(utc("2021-11-07T05:45:00Z"), ny),
            Some((utc("2021-11-07T05:30:00Z"), utc("2021-11-07T06:00:00Z")))
        );
        assert_eq!(
            p.window_containing(utc("2021-11-07T10:00:00Z"), ny),
            Some((utc("2021-11-07T06:30:00Z"), utc("2021-11-07T13:00:00Z")))
        );
    }

    #[test]
    fn window_from_skips_to_next_opening() {
        let p = period("08:00", "17:00");
        assert_eq!(
            p.window_from(utc("2020-01-10T18:00:00Z"), Tz::UTC),
            Some((utc("2020-01-11T08:00:00Z"), utc("2020-01-11T17:00:00Z")))
        );
        assert_eq!(
            p.window_from(utc("2020-01-11T12:00:00Z"), Tz::UTC),
            Some((utc("2020-01-11T08:00:00Z"), utc("2020-01-11T17:00:00Z")))
        );
        let empty = period("09:00", "09:00");
        assert_eq!(empty.window_from(utc("2020-01-11T12:00:00Z"), Tz::UTC), None);
    }

    #[test]
    fn absent_period_is_always_active() {
        let t = utc("2020-01-10T03:00:00Z");
        assert!(is_active(None, t, Tz::UTC));
        assert_eq!(next_boundary(None, t, Tz::UTC), None);

        let p = period("08:00", "17:00");
        assert!(!is_active(Some(&p), t, Tz::UTC));
        assert_eq!(
            next_boundary(Some(&p), t, Tz::UTC),
            Some(utc("2020-01-10T08:00:00Z"))
        );
    }

    #[test]
    fn serde_uses_hhmm_strings() {
        let p: ActivePeriod =
            serde_json::from_str(r#"{"start_time":"22:00","end_time":"06:00"}"#).unwrap();
        assert!(p.wraps_midnight());
        let json = serde_json::to_value(p).unwrap();
        assert_eq!(json["start_time"], "22:00");
        assert_eq!(json["end_time"], "06:00");

        assert!(serde_json::from_str::<ActivePeriod>(
            r#"{"start_time":"25:00","end_time":"06:00"}"#
        )
        .is_err());
    }
}
