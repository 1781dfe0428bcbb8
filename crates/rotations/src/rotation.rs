//! Rotation definition and the computed [`Shift`] value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::active_period::ActivePeriod;
use crate::roster::Participant;

/// Unit of a rotation's shift length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Hours,
    Days,
    Weeks,
}

impl LengthUnit {
    pub fn seconds(self) -> i64 {
        match self {
            LengthUnit::Hours => 3_600,
            LengthUnit::Days => 86_400,
            LengthUnit::Weeks => 604_800,
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthUnit::Hours => write!(f, "hours"),
            LengthUnit::Days => write!(f, "days"),
            LengthUnit::Weeks => write!(f, "weeks"),
        }
    }
}

/// A recurring on-call assignment over an ordered set of participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rotation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub starts_at: DateTime<Utc>,
    /// Open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    pub length: u32,
    pub length_unit: LengthUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_period: Option<ActivePeriod>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl Rotation {
    /// Duration of one nominal (unrestricted) shift.
    pub fn shift_duration(&self) -> Duration {
        Duration::seconds(i64::from(self.length) * self.length_unit.seconds())
    }
}

/// One concrete on-call assignment. Computed, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub participant: Participant,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Shift {
    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }

    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.starts_at <= instant && instant < self.ends_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_lengths_are_fixed_seconds() {
        assert_eq!(LengthUnit::Hours.seconds(), 3_600);
        assert_eq!(LengthUnit::Days.seconds(), 86_400);
        assert_eq!(LengthUnit::Weeks.seconds(), 604_800);
    }

    #[test]
    fn rotation_deserializes_from_yaml() {
        let rotation: Rotation = serde_yaml::from_str(
            r#"
id: primary
starts_at: "2020-01-10T09:00:00Z"
length: 2
length_unit: weeks
active_period:
  start_time: "08:00"
  end_time: "17:00"
participants:
  - user: alice
    color_weight: "500"
    color_palette: blue
  - user: bob
    removed: true
"#,
        )
        .unwrap();
        assert_eq!(rotation.ends_at, None);
        assert_eq!(rotation.shift_duration(), Duration::weeks(2));
        assert_eq!(rotation.active_period.unwrap().to_string(), "08:00-17:00");
        assert_eq!(rotation.participants.len(), 2);
        assert!(rotation.participants[1].removed);
        assert_eq!(rotation.participants[1].color_palette, "");
    }
}
