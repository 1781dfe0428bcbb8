//! Escalation policy checks: rule count, thresholds, duplicates, ordering.

use std::collections::HashSet;

use oncall_core::OncallConfig;

use crate::escalation::{AlertStatus, EscalationPolicy};

use super::{ValidationResult, ViolationCode};

/// Validate an escalation policy against the configured limits.
pub fn validate_policy(policy: &EscalationPolicy, config: &OncallConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    if policy.rules.is_empty() {
        result.error(
            ViolationCode::EmptyRuleSet,
            "rules",
            "An escalation policy needs at least one rule",
        );
        return result;
    }

    if policy.rules.len() > config.max_escalation_rules {
        result.error(
            ViolationCode::TooManyRules,
            "rules",
            format!(
                "An escalation policy may have at most {} rules, got {}",
                config.max_escalation_rules,
                policy.rules.len()
            ),
        );
    }

    let mut seen = HashSet::new();
    for (i, rule) in policy.rules.iter().enumerate() {
        if rule.elapsed_time_seconds > config.max_elapsed_seconds {
            result.error(
                ViolationCode::ElapsedTimeOutOfRange,
                format!("rules[{i}].elapsed_time_seconds"),
                format!(
                    "Elapsed time must be between 0 and {} seconds, got {}",
                    config.max_elapsed_seconds, rule.elapsed_time_seconds
                ),
            );
        }

        if !seen.insert(rule) {
            result.error(
                ViolationCode::DuplicateRule,
                format!("rules[{i}]"),
                "A rule with the same time, status and target already exists",
            );
        }

        if rule.status == AlertStatus::Triggered {
            result.warn(
                format!("rules[{i}].status"),
                "Every alert has already been triggered; this rule can never fire",
            );
        }
    }

    let ascending = policy
        .rules
        .windows(2)
        .all(|w| w[0].elapsed_time_seconds <= w[1].elapsed_time_seconds);
    if !ascending {
        result.warn("rules", "Rules are not listed in ascending elapsed time");
    }

    result
}
