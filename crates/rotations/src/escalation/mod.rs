//! Escalation policies and rule selection.
//!
//! A policy is an ordered list of rules. Each rule names a time threshold and
//! the alert status that stops it: "if the alert is still not acknowledged
//! after 5 minutes, page the on-call schedule". [`select_due_rule`] picks the
//! furthest rule whose threshold has passed and whose status the alert has not
//! yet reached.

mod evaluator;


pub use self::evaluator::{select_due_rule, AlertState};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an alert, in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    #[serde(alias = "detected")]
    Triggered,
    #[serde(alias = "ack")]
    Acknowledged,
    Resolved,
    Ignored,
}

impl AlertStatus {
    pub fn rank(self) -> u8 {
        match self {
            AlertStatus::Triggered => 0,
            AlertStatus::Acknowledged => 1,
            AlertStatus::Resolved => 2,
            AlertStatus::Ignored => 3,
        }
    }

    /// Whether an alert in this status has reached `target`.
    pub fn has_reached(self, target: AlertStatus) -> bool {
        self.rank() >= target.rank()
    }
}

impl std::str::FromStr for AlertStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triggered" | "detected" => Ok(AlertStatus::Triggered),
            "acknowledged" | "ack" => Ok(AlertStatus::Acknowledged),
            "resolved" => Ok(AlertStatus::Resolved),
            "ignored" => Ok(AlertStatus::Ignored),
            other => Err(format!("unknown alert status '{other}'")),
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Triggered => write!(f, "triggered"),
            AlertStatus::Acknowledged => write!(f, "acknowledged"),
            AlertStatus::Resolved => write!(f, "resolved"),
            AlertStatus::Ignored => write!(f, "ignored"),
        }
    }
}

/// Who gets notified when a rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationTarget {
    /// Whoever is on call in the named schedule.
    Schedule(String),
    User(String),
}

/// One threshold in a policy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscalationRule {
    pub elapsed_time_seconds: u32,
    /// The rule stops applying once the alert reaches this status.
    pub status: AlertStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EscalationTarget>,
}

impl EscalationRule {
    pub fn new(elapsed_time_seconds: u32, status: AlertStatus) -> Self {
        Self {
            elapsed_time_seconds,
            status,
            target: None,
        }
    }

    pub fn with_target(mut self, target: EscalationTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Due once the threshold has passed, unless the alert already reached `status`.
    pub fn is_due(&self, alert: &AlertState) -> bool {
        alert.elapsed_seconds_since_trigger >= u64::from(self.elapsed_time_seconds)
            && !alert.current_status.has_reached(self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: Vec<EscalationRule>,
}

/// A rule with the instant it becomes due for a given alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingEscalation {
    /// Position of the rule in the policy.
    pub rule_index: usize,
    pub rule: EscalationRule,
    pub process_at: DateTime<Utc>,
}

impl EscalationPolicy {
    /// The rule to action for `alert` right now, if any.
    pub fn due_rule(&self, alert: &AlertState) -> oncall_core::Result<Option<&EscalationRule>> {
        select_due_rule(&self.rules, alert)
    }

    /// When each rule falls due for an alert triggered at `triggered_at`,
    /// earliest first.
    pub fn pending_escalations(&self, triggered_at: DateTime<Utc>) -> Vec<PendingEscalation> {
        let mut pending: Vec<PendingEscalation> = self
            .rules
            .iter()
            .enumerate()
            .map(|(rule_index, rule)| PendingEscalation {
                rule_index,
                rule: rule.clone(),
                process_at: triggered_at + Duration::seconds(i64::from(rule.elapsed_time_seconds)),
            })
            .collect();
        pending.sort_by_key(|p| (p.process_at, p.rule_index));
        pending
    }
}
