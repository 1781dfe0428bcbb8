//! Ordered rotation participants.

use std::collections::HashSet;

use oncall_core::{OncallError, Result};
use serde::{Deserialize, Serialize};

/// Identity of the user behind a participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One member of a rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user: UserId,
    /// Display-only, carried through unchanged.
    #[serde(default)]
    pub color_weight: String,
    /// Display-only, carried through unchanged.
    #[serde(default)]
    pub color_palette: String,
    /// Soft-removed participants keep their history but take no new shifts.
    #[serde(default)]
    pub removed: bool,
}

impl Participant {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            color_weight: String::new(),
            color_palette: String::new(),
            removed: false,
        }
    }

    pub fn with_colors(mut self, weight: impl Into<String>, palette: impl Into<String>) -> Self {
        self.color_weight = weight.into();
        self.color_palette = palette.into();
        self
    }

    pub fn removed(mut self) -> Self {
        self.removed = true;
        self
    }
}

/// Immutable roster in rotation order.
///
/// `all` keeps every participant, removed ones included, for attributing
/// past shifts. `active` is the round-robin sequence for new shifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRoster {
    all: Vec<Participant>,
    active: Vec<usize>,
}

impl ParticipantRoster {
    /// Build a roster in the order given. A user may appear only once among
    /// the non-removed entries.
    pub fn build(participants: Vec<Participant>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut active = Vec::new();
        for (idx, p) in participants.iter().enumerate() {
            if p.removed {
                continue;
            }
            if !seen.insert(&p.user) {
                return Err(OncallError::DuplicateParticipant(p.user.to_string()));
            }
            active.push(idx);
        }
        Ok(Self {
            all: participants,
            active,
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Participant on duty for the `rotation_index`-th shift.
    pub fn at(&self, rotation_index: u64) -> Result<&Participant> {
        let count = self.active.len() as u64;
        if count == 0 {
            return Err(OncallError::EmptyRoster);
        }
        let slot = self.active[(rotation_index % count) as usize];
        Ok(&self.all[slot])
    }

    /// Non-removed participants in rotation order.
    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.active.iter().map(|&i| &self.all[i])
    }

    /// Every participant as supplied, including removed ones.
    pub fn all(&self) -> &[Participant] {
        &self.all
    }

    /// Historical lookup; prefers the live entry when a user was removed and re-added.
    pub fn find(&self, user: &UserId) -> Option<&Participant> {
        self.active()
            .find(|p| &p.user == user)
            .or_else(|| self.all.iter().find(|p| &p.user == user))
    }
}
