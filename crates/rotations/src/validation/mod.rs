//! Pre-commit validation with structured, batched violations.
//!
//! Checks proposed rotation mutations and escalation policies without touching
//! any state. Every check runs; all violations are collected into one
//! [`ValidationResult`] so callers can present them together. Errors block the
//! mutation, warnings are advisory.

mod policy_checks;
mod rotation_checks;

pub use self::policy_checks::validate_policy;
pub use self::rotation_checks::{RotationMutationValidator, RotationPayload};

use serde::{Deserialize, Serialize};

// ── Result types ────────────────────────────────────────────────────

/// Machine-readable kind of a blocking violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    InvalidRange,
    InvalidTimeFormat,
    InvalidLength,
    DuplicateParticipant,
    MaximumParticipants,
    IncompatibleActivePeriod,
    EmptyRuleSet,
    TooManyRules,
    ElapsedTimeOutOfRange,
    DuplicateRule,
}

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub code: ViolationCode,
    /// JSON-path-like location, e.g. `"active_period.start_time"`.
    pub path: String,
    pub message: String,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(
        &mut self,
        code: ViolationCode,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(Violation {
            code,
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }

    /// Codes of all blocking violations, in the order found.
    pub fn codes(&self) -> Vec<ViolationCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// `Ok(())` when valid, otherwise every violation.
    pub fn into_result(self) -> Result<(), Vec<Violation>> {
        if self.valid {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
