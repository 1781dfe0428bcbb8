mod cli;

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use oncall_core::config::{load_dotenv, OncallConfig};
use oncall_core::{IanaTimezones, TimeWindow};
use oncall_rotations::escalation::EscalationPolicy;
use oncall_rotations::loader::{self, LoadStatus, ScheduleLoader};
use oncall_rotations::shifts::ShiftGenerator;
use oncall_rotations::{
    validate_policy, AlertState, RotationMutationValidator, RotationPayload, RotationShifts,
    Schedule,
};

use crate::cli::{CliArgs, Command};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    load_dotenv();
    let args = CliArgs::parse();
    let config = OncallConfig::for_profile(&args.profile);
    config.log_summary();

    match args.command {
        Command::Shifts {
            schedule,
            from,
            to,
            rotation,
        } => {
            let schedule = read_schedule(&schedule, &config)?;
            let window = TimeWindow::new(from, to)?;
            let shifts = match rotation {
                Some(id) => {
                    let rotation = schedule.rotation(&id).with_context(|| {
                        format!("schedule '{}' has no rotation '{id}'", schedule.id)
                    })?;
                    let tz = schedule.zone(&IanaTimezones)?;
                    let generator = ShiftGenerator::new(rotation, tz, config.max_shifts)?;
                    vec![RotationShifts {
                        rotation_id: id,
                        shifts: generator.generate(&window)?,
                    }]
                }
                None => schedule.shifts(&window, &IanaTimezones, config.max_shifts)?,
            };
            print_json(&shifts)
        }

        Command::Now { schedule, at } => {
            let schedule = read_schedule(&schedule, &config)?;
            let at = at.unwrap_or_else(Utc::now);
            let oncall = schedule.oncall_at(at, &IanaTimezones, config.max_shifts)?;
            info!(schedule = %schedule.id, at = %at, rotations = oncall.len(), "resolved on-call");
            print_json(&json!({ "at": at, "oncall": oncall }))
        }

        Command::Validate {
            schedule: Some(path),
            ..
        } => {
            let schedule = read_schedule(&path, &config)?;
            let validator = RotationMutationValidator::from_config(&config);
            let mut all_valid = true;
            let mut report = Vec::with_capacity(schedule.rotations.len());
            for rotation in &schedule.rotations {
                let result = validator.validate(&RotationPayload::from(rotation));
                all_valid &= result.valid;
                report.push(json!({ "rotation_id": rotation.id, "result": result }));
            }
            print_json(&report)?;
            if !all_valid {
                bail!("schedule '{}' has invalid rotations", schedule.id);
            }
            Ok(())
        }

        Command::Validate { policy, .. } => {
            let path = policy.context("either --schedule or --policy is required")?;
            let policy = read_policy(&path)?;
            let result = validate_policy(&policy, &config);
            let valid = result.valid;
            print_json(&result)?;
            if !valid {
                bail!("escalation policy '{}' is invalid", policy.id);
            }
            Ok(())
        }

        Command::Escalate {
            policy,
            elapsed,
            status,
        } => {
            let policy = read_policy(&policy)?;
            let alert = AlertState::new(elapsed, status);
            let rule = policy.due_rule(&alert)?;
            print_json(&json!({ "policy_id": policy.id, "alert": alert, "rule": rule }))
        }

        Command::Load { dir } => {
            let mut loader =
                ScheduleLoader::new(dir).with_default_timezone(&config.default_timezone);
            let results = loader
                .load_all(&IanaTimezones)
                .with_context(|| format!("failed to scan {}", loader.root().display()))?;

            let mut failures = 0;
            let report: Vec<_> = results
                .iter()
                .map(|r| {
                    let path = r.path.display().to_string();
                    match &r.status {
                        LoadStatus::Loaded { id } => json!({ "path": path, "loaded": id }),
                        LoadStatus::Skipped { reason } => {
                            json!({ "path": path, "skipped": reason })
                        }
                        LoadStatus::Failed { error } => {
                            failures += 1;
                            json!({ "path": path, "failed": error })
                        }
                    }
                })
                .collect();
            print_json(&report)?;
            if failures > 0 {
                warn!(failures, "some documents failed to load");
                bail!("{failures} document(s) failed to load");
            }
            Ok(())
        }
    }
}

fn read_schedule(path: &Path, config: &OncallConfig) -> Result<Schedule> {
    loader::load_schedule(path, &IanaTimezones, &config.default_timezone)
        .with_context(|| format!("failed to load schedule {}", path.display()))
}

fn read_policy(path: &Path) -> Result<EscalationPolicy> {
    loader::load_policy(path).with_context(|| format!("failed to load policy {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
