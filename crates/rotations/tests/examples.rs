//! Integration tests over the example documents in `data/schedules/examples/`.

use chrono::{DateTime, Utc};
use oncall_core::{IanaTimezones, OncallConfig, TimeWindow};
use oncall_rotations::escalation::EscalationTarget;
use oncall_rotations::loader::{load_policy, load_schedule, LoadStatus, ScheduleLoader};
use oncall_rotations::{
    validate_policy, AlertState, AlertStatus, EscalationPolicy, RotationMutationValidator,
    RotationPayload, Schedule, Shift,
};

/// Integration tests run from the crate directory, so go up two levels.
fn examples_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/schedules/examples")
}

fn schedule(filename: &str) -> Schedule {
    let path = examples_dir().join(filename);
    load_schedule(&path, &IanaTimezones, "UTC")
        .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn policy(filename: &str) -> EscalationPolicy {
    let path = examples_dir().join(filename);
    load_policy(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

fn utc(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::new(utc(start), utc(end)).unwrap()
}

fn summary(shifts: &[Shift]) -> Vec<(String, String, String)> {
    shifts
        .iter()
        .map(|s| {
            (
                s.participant.user.to_string(),
                s.starts_at.format("%m-%dT%H:%M").to_string(),
                s.ends_at.format("%m-%dT%H:%M").to_string(),
            )
        })
        .collect()
}

fn row(user: &str, from: &str, to: &str) -> (String, String, String) {
    (user.to_string(), from.to_string(), to.to_string())
}

// ── directory scan ─────────────────────────────────────────

#[test]
fn every_example_loads() {
    let mut loader = ScheduleLoader::new(examples_dir());
    let results = loader.load_all(&IanaTimezones).unwrap();

    for r in &results {
        assert!(
            matches!(r.status, LoadStatus::Loaded { .. }),
            "{}: {:?}",
            r.path.display(),
            r.status
        );
    }
    let ids: Vec<&str> = loader.schedules().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["platform", "support-us"]);
    assert!(loader.policy("default").is_some());
}

#[test]
fn every_example_passes_validation() {
    let config = OncallConfig::default();
    let validator = RotationMutationValidator::from_config(&config);
    for file in ["platform.yml", "support-us.yml"] {
        for rotation in &schedule(file).rotations {
            let result = validator.validate(&RotationPayload::from(rotation));
            assert!(result.valid, "{file}/{}: {:?}", rotation.id, result.errors);
        }
    }

    let result = validate_policy(&policy("default-policy.yml"), &config);
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.warnings.is_empty());
}

// ── platform.yml ───────────────────────────────────────────

#[test]
fn platform_oncall_during_business_hours() {
    let oncall = schedule("platform.yml")
        .oncall_at(utc("2024-01-17T10:00:00Z"), &IanaTimezones, 1000)
        .unwrap();
    let who: Vec<(&str, &str)> = oncall
        .iter()
        .map(|o| (o.rotation_id.as_str(), o.shift.participant.user.as_str()))
        .collect();
    assert_eq!(who, vec![("primary", "carol"), ("business-hours", "dave")]);

    let primary = &oncall[0].shift;
    assert_eq!(primary.starts_at, utc("2024-01-15T08:00:00Z"));
    assert_eq!(primary.ends_at, utc("2024-01-22T08:00:00Z"));
}

#[test]
fn platform_oncall_overnight_skips_removed_participant() {
    let oncall = schedule("platform.yml")
        .oncall_at(utc("2024-01-17T23:00:00Z"), &IanaTimezones, 1000)
        .unwrap();
    let who: Vec<(&str, &str)> = oncall
        .iter()
        .map(|o| (o.rotation_id.as_str(), o.shift.participant.user.as_str()))
        .collect();
    // The night of the 17th ends in nominal day 17, after frank's turn.
    assert_eq!(who, vec![("primary", "carol"), ("overnight", "heidi")]);

    let night = &oncall[1].shift;
    assert_eq!(night.starts_at, utc("2024-01-17T21:00:00Z"));
    assert_eq!(night.ends_at, utc("2024-01-18T05:00:00Z"));
}

#[test]
fn platform_shifts_for_one_day() {
    let per_rotation = schedule("platform.yml")
        .shifts(
            &window("2024-01-17T00:00:00Z", "2024-01-18T00:00:00Z"),
            &IanaTimezones,
            1000,
        )
        .unwrap();
    assert_eq!(per_rotation.len(), 3);

    assert_eq!(
        summary(&per_rotation[0].shifts),
        vec![row("carol", "01-17T00:00", "01-18T00:00")]
    );
    // 09:00-17:00 Berlin is 08:00-16:00 UTC in winter.
    assert_eq!(
        summary(&per_rotation[1].shifts),
        vec![row("dave", "01-17T08:00", "01-17T16:00")]
    );
    // Each night is one shift, owned by the nominal day it ends in and
    // clipped to the query window.
    assert_eq!(
        summary(&per_rotation[2].shifts),
        vec![
            row("frank", "01-17T00:00", "01-17T05:00"),
            row("heidi", "01-17T21:00", "01-18T00:00"),
        ]
    );
}

// ── support-us.yml ─────────────────────────────────────────

#[test]
fn support_desk_follows_local_time_across_dst() {
    let s = schedule("support-us.yml");
    let per_rotation = s
        .shifts(
            &window("2024-03-09T00:00:00Z", "2024-03-12T00:00:00Z"),
            &IanaTimezones,
            1000,
        )
        .unwrap();
    let shifts = &per_rotation[0].shifts;

    // 08:00-17:00 New York: UTC-5 before 2024-03-10, UTC-4 after.
    assert_eq!(
        summary(shifts),
        vec![
            row("judy", "03-09T13:00", "03-09T22:00"),
            row("ivan", "03-10T12:00", "03-10T21:00"),
            row("judy", "03-11T12:00", "03-11T21:00"),
        ]
    );
}

#[test]
fn support_desk_stops_at_rotation_end() {
    let s = schedule("support-us.yml");
    let per_rotation = s
        .shifts(
            &window("2024-03-30T00:00:00Z", "2024-04-05T00:00:00Z"),
            &IanaTimezones,
            1000,
        )
        .unwrap();
    let shifts = &per_rotation[0].shifts;
    assert_eq!(shifts.len(), 2);
    assert!(shifts.iter().all(|s| s.ends_at <= utc("2024-04-01T04:00:00Z")));
}

// ── default-policy.yml ─────────────────────────────────────

#[test]
fn default_policy_escalates_in_order() {
    let p = policy("default-policy.yml");
    let due = |elapsed: u64, status: AlertStatus| {
        p.due_rule(&AlertState::new(elapsed, status))
            .unwrap()
            .map(|r| r.elapsed_time_seconds)
    };

    assert_eq!(due(0, AlertStatus::Triggered), Some(0));
    assert_eq!(due(600, AlertStatus::Triggered), Some(300));
    assert_eq!(due(600, AlertStatus::Acknowledged), None);
    assert_eq!(due(2000, AlertStatus::Acknowledged), Some(1800));
    assert_eq!(due(2000, AlertStatus::Resolved), None);

    assert_eq!(
        p.rules[0].target,
        Some(EscalationTarget::Schedule("platform".into()))
    );
}

#[test]
fn default_policy_pending_escalations() {
    let pending = policy("default-policy.yml").pending_escalations(utc("2024-01-17T10:00:00Z"));
    let times: Vec<DateTime<Utc>> = pending.iter().map(|p| p.process_at).collect();
    assert_eq!(
        times,
        vec![
            utc("2024-01-17T10:00:00Z"),
            utc("2024-01-17T10:05:00Z"),
            utc("2024-01-17T10:30:00Z"),
        ]
    );
}
