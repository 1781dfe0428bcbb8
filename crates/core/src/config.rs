use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub const DEFAULT_MAX_SHIFTS: usize = 1000;
pub const DEFAULT_MAX_PARTICIPANTS: usize = 100;
pub const DEFAULT_MAX_ESCALATION_RULES: usize = 10;
pub const DEFAULT_MAX_ELAPSED_SECONDS: u32 = 86_400;
pub const DEFAULT_TIMEZONE: &str = "UTC";

// ── Top-level config ──────────────────────────────────────────

/// Limits and defaults for shift generation, rotation mutations and escalation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OncallConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    /// Hard cap on shifts emitted by a single generation request.
    pub max_shifts: usize,
    /// Largest roster a rotation mutation may propose.
    pub max_participants: usize,
    /// Most rules a single escalation policy may hold.
    pub max_escalation_rules: usize,
    /// Largest `elapsed_time_seconds` an escalation rule may carry.
    pub max_elapsed_seconds: u32,
    /// IANA zone used when a schedule does not name one.
    pub default_timezone: String,
}

impl OncallConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ONCALL_PROFILE`. When set (e.g. `PROD`), every
    /// key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ONCALL_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            max_shifts: profiled_env_usize(p, "ONCALL_MAX_SHIFTS", DEFAULT_MAX_SHIFTS),
            max_participants: profiled_env_usize(
                p,
                "ONCALL_MAX_PARTICIPANTS",
                DEFAULT_MAX_PARTICIPANTS,
            ),
            max_escalation_rules: profiled_env_usize(
                p,
                "ONCALL_MAX_ESCALATION_RULES",
                DEFAULT_MAX_ESCALATION_RULES,
            ),
            max_elapsed_seconds: profiled_env_u32(
                p,
                "ONCALL_MAX_ELAPSED_SECONDS",
                DEFAULT_MAX_ELAPSED_SECONDS,
            ),
            default_timezone: profiled_env_or(p, "ONCALL_DEFAULT_TIMEZONE", DEFAULT_TIMEZONE),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  shifts:      max={}", self.max_shifts);
        tracing::info!("  rotations:   max_participants={}", self.max_participants);
        tracing::info!(
            "  escalation:  max_rules={}, max_elapsed={}s",
            self.max_escalation_rules,
            self.max_elapsed_seconds
        );
        tracing::info!("  timezone:    default={}", self.default_timezone);
    }
}

impl Default for OncallConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            max_shifts: DEFAULT_MAX_SHIFTS,
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            max_escalation_rules: DEFAULT_MAX_ESCALATION_RULES,
            max_elapsed_seconds: DEFAULT_MAX_ELAPSED_SECONDS,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}
