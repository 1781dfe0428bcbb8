use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use oncall_rotations::AlertStatus;

/// On-call rotation engine.
///
/// Computes shifts and current on-call participants from YAML schedules,
/// validates rotations and policies, and evaluates escalation rules.
#[derive(Parser, Debug)]
#[command(name = "oncall", version, about = "On-call rotation engine")]
pub struct CliArgs {
    /// Config profile (prefix applied to ONCALL_* env vars)
    #[arg(long, global = true, env = "ONCALL_PROFILE", default_value = "")]
    pub profile: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List shifts inside a UTC window
    Shifts {
        /// Schedule YAML file
        #[arg(long)]
        schedule: PathBuf,

        /// Window start (RFC 3339)
        #[arg(long)]
        from: DateTime<Utc>,

        /// Window end (RFC 3339, exclusive)
        #[arg(long)]
        to: DateTime<Utc>,

        /// Only this rotation
        #[arg(long)]
        rotation: Option<String>,
    },

    /// Who is on call at an instant (defaults to now)
    Now {
        #[arg(long)]
        schedule: PathBuf,

        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Validate every rotation of a schedule, or an escalation policy
    Validate {
        #[arg(long, conflicts_with = "policy", required_unless_present = "policy")]
        schedule: Option<PathBuf>,

        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// Pick the escalation rule to action for an alert
    Escalate {
        /// Escalation policy YAML file
        #[arg(long)]
        policy: PathBuf,

        /// Seconds since the alert was triggered
        #[arg(long)]
        elapsed: u64,

        /// Current alert status: triggered, acknowledged, resolved, ignored
        #[arg(long, default_value = "triggered")]
        status: AlertStatus,
    },

    /// Load a directory of schedules and policies and report per-file results
    Load {
        #[arg(long, env = "ONCALL_DATA_DIR", default_value = "data/schedules")]
        dir: PathBuf,
    },
}
