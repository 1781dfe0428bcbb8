//! Document parsing and the directory-backed [`ScheduleLoader`].

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use oncall_core::config::DEFAULT_TIMEZONE;
use oncall_core::TimezoneLookup;
use serde::Deserialize;
use tracing::{info, warn};

use crate::escalation::EscalationPolicy;
use crate::schedule::Schedule;

use super::error::{LoadError, LoadResult, LoadStatus, Result};

/// Parse a schedule document and resolve its timezone.
///
/// A schedule without a `timezone` gets `default_timezone`. The zone is looked
/// up here so a misspelled name fails at load rather than on the first shift
/// computation.
pub fn parse_schedule(
    yaml: &str,
    lookup: &impl TimezoneLookup,
    default_timezone: &str,
) -> Result<Schedule> {
    let mut schedule: Schedule = serde_yaml::from_str(yaml)?;
    resolve_schedule(&mut schedule, lookup, default_timezone)?;
    Ok(schedule)
}

pub fn load_schedule(
    path: &Path,
    lookup: &impl TimezoneLookup,
    default_timezone: &str,
) -> Result<Schedule> {
    let contents = fs::read_to_string(path)?;
    parse_schedule(&contents, lookup, default_timezone)
}

/// Parse an escalation policy document.
pub fn parse_policy(yaml: &str) -> Result<EscalationPolicy> {
    let policy: EscalationPolicy = serde_yaml::from_str(yaml)?;
    if policy.id.is_empty() {
        return Err(LoadError::Invalid("policy id must not be empty".to_string()));
    }
    Ok(policy)
}

pub fn load_policy(path: &Path) -> Result<EscalationPolicy> {
    let contents = fs::read_to_string(path)?;
    parse_policy(&contents)
}

fn resolve_schedule(
    schedule: &mut Schedule,
    lookup: &impl TimezoneLookup,
    default_timezone: &str,
) -> Result<()> {
    if schedule.id.is_empty() {
        return Err(LoadError::Invalid("schedule id must not be empty".to_string()));
    }
    if schedule.timezone.is_empty() {
        schedule.timezone = default_timezone.to_string();
    }
    schedule.zone(lookup)?;

    let mut ids = HashSet::new();
    for rotation in &schedule.rotations {
        if !ids.insert(rotation.id.as_str()) {
            return Err(LoadError::Invalid(format!(
                "schedule '{}' lists rotation '{}' more than once",
                schedule.id, rotation.id
            )));
        }
    }
    Ok(())
}

/// A file in a scanned directory, discriminated by its `kind` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Document {
    Schedule(Schedule),
    EscalationPolicy(EscalationPolicy),
}

impl Document {
    fn id(&self) -> &str {
        match self {
            Document::Schedule(s) => &s.id,
            Document::EscalationPolicy(p) => &p.id,
        }
    }
}

/// Loads every schedule and escalation policy under a directory.
///
/// Files must carry `kind: schedule` or `kind: escalation_policy`. Dotfiles
/// and non-YAML files are skipped; a bad file is reported in its
/// [`LoadResult`] without aborting the scan.
pub struct ScheduleLoader {
    root: PathBuf,
    default_timezone: String,
    schedules: HashMap<String, Schedule>,
    policies: HashMap<String, EscalationPolicy>,
}

impl ScheduleLoader {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            schedules: HashMap::new(),
            policies: HashMap::new(),
        }
    }

    /// Zone applied to schedules that don't name one.
    pub fn with_default_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.default_timezone = timezone.into();
        self
    }

    /// Recursively scan the root directory. Entries are visited in path
    /// order, so when two files share an ID the first one wins.
    pub fn load_all(&mut self, lookup: &impl TimezoneLookup) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let root = self.root.clone();
        self.scan_dir_recursive(&root, lookup, &mut results)?;
        info!(
            path = %self.root.display(),
            schedules = self.schedules.len(),
            policies = self.policies.len(),
            "loaded on-call documents"
        );
        Ok(results)
    }

    fn scan_dir_recursive(
        &mut self,
        dir: &Path,
        lookup: &impl TimezoneLookup,
        results: &mut Vec<LoadResult>,
    ) -> Result<()> {
        let mut paths = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        for path in paths {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, lookup, results)?;
                continue;
            }

            let is_yaml = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "yml" || e == "yaml")
                .unwrap_or(false);
            if !is_yaml {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML file".to_string(),
                    },
                });
                continue;
            }

            let status = match self.load_file(&path, lookup) {
                Ok(id) => {
                    info!(id = %id, path = %path.display(), "loaded document");
                    LoadStatus::Loaded { id }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load document");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }
        Ok(())
    }

    fn load_file(&mut self, path: &Path, lookup: &impl TimezoneLookup) -> Result<String> {
        let contents = fs::read_to_string(path)?;
        let document: Document = serde_yaml::from_str(&contents)?;
        let id = document.id().to_string();
        if id.is_empty() {
            return Err(LoadError::Invalid("document id must not be empty".to_string()));
        }

        match document {
            Document::Schedule(mut schedule) => {
                resolve_schedule(&mut schedule, lookup, &self.default_timezone)?;
                if self.schedules.contains_key(&id) {
                    return Err(LoadError::Invalid(format!("duplicate schedule id '{id}'")));
                }
                self.schedules.insert(id.clone(), schedule);
            }
            Document::EscalationPolicy(policy) => {
                if self.policies.contains_key(&id) {
                    return Err(LoadError::Invalid(format!("duplicate policy id '{id}'")));
                }
                self.policies.insert(id.clone(), policy);
            }
        }
        Ok(id)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.schedules.get(id)
    }

    pub fn policy(&self, id: &str) -> Option<&EscalationPolicy> {
        self.policies.get(id)
    }

    /// Loaded schedules sorted by ID.
    pub fn schedules(&self) -> Vec<&Schedule> {
        let mut all: Vec<&Schedule> = self.schedules.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Loaded policies sorted by ID.
    pub fn policies(&self) -> Vec<&EscalationPolicy> {
        let mut all: Vec<&EscalationPolicy> = self.policies.values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}
