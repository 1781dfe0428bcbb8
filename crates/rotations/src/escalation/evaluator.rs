//! Furthest-due rule selection.

use oncall_core::{OncallError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlertStatus, EscalationRule};

/// What the evaluator knows about an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertState {
    pub elapsed_seconds_since_trigger: u64,
    pub current_status: AlertStatus,
}

impl AlertState {
    pub fn new(elapsed_seconds_since_trigger: u64, current_status: AlertStatus) -> Self {
        Self {
            elapsed_seconds_since_trigger,
            current_status,
        }
    }
}

/// Pick the due rule with the largest threshold.
///
/// Rules need not be sorted. Among due rules sharing the largest threshold
/// the one listed first wins. Fails with `EmptyRuleSet` on an empty list.
pub fn select_due_rule<'r>(
    rules: &'r [EscalationRule],
    alert: &AlertState,
) -> Result<Option<&'r EscalationRule>> {
    if rules.is_empty() {
        return Err(OncallError::EmptyRuleSet);
    }

    let selected = rules
        .iter()
        .filter(|rule| rule.is_due(alert))
        .fold(None::<&EscalationRule>, |best, rule| match best {
            Some(b) if b.elapsed_time_seconds >= rule.elapsed_time_seconds => Some(b),
            _ => Some(rule),
        });

    debug!(
        elapsed = alert.elapsed_seconds_since_trigger,
        status = %alert.current_status,
        selected = ?selected.map(|r| r.elapsed_time_seconds),
        "evaluated escalation rules"
    );
    Ok(selected)
}
