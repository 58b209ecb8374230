//! Viewer preferences — the per-user record the ranker personalizes on.
//!
//! Absence of a record is equivalent to "no preference": every
//! preference-based score term contributes zero.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{
  Error,
  event::{EventFormat, SkillLevel},
};

// ─── Format preference ───────────────────────────────────────────────────────

/// The attendance format a viewer prefers. `Any` disables both format
/// scoring rules.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FormatPreference {
  Virtual,
  InPerson,
  Hybrid,
  #[default]
  Any,
}

impl FormatPreference {
  pub fn is_any(self) -> bool { matches!(self, Self::Any) }

  /// Exact match between the preference and an event's format.
  pub fn matches(self, format: EventFormat) -> bool {
    matches!(
      (self, format),
      (Self::Virtual, EventFormat::Virtual)
        | (Self::InPerson, EventFormat::InPerson)
        | (Self::Hybrid, EventFormat::Hybrid)
    )
  }
}

impl FromStr for FormatPreference {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "virtual" => Ok(Self::Virtual),
      "in-person" => Ok(Self::InPerson),
      "hybrid" => Ok(Self::Hybrid),
      "any" => Ok(Self::Any),
      other => Err(Error::UnknownEventFormat(other.to_string())),
    }
  }
}

// ─── Skill preference ────────────────────────────────────────────────────────

/// The skill level a viewer wants to see. `All` disables the skill rule.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkillPreference {
  Beginner,
  Intermediate,
  Advanced,
  #[default]
  All,
}

impl SkillPreference {
  pub fn is_all(self) -> bool { matches!(self, Self::All) }

  /// Whether an event at `level` suits this preference. Events targeting
  /// every level (`SkillLevel::All`) suit any specific preference.
  pub fn admits(self, level: SkillLevel) -> bool {
    level == SkillLevel::All
      || matches!(
        (self, level),
        (Self::Beginner, SkillLevel::Beginner)
          | (Self::Intermediate, SkillLevel::Intermediate)
          | (Self::Advanced, SkillLevel::Advanced)
      )
  }
}

impl FromStr for SkillPreference {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "beginner" => Ok(Self::Beginner),
      "intermediate" => Ok(Self::Intermediate),
      "advanced" => Ok(Self::Advanced),
      "all" => Ok(Self::All),
      other => Err(Error::UnknownSkillLevel(other.to_string())),
    }
  }
}

// ─── Preferences ─────────────────────────────────────────────────────────────

/// A viewer's saved feed preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
  pub viewer_id:   Uuid,
  /// Preferred department / region, compared verbatim against
  /// `Event::region`.
  pub region:      Option<String>,
  #[serde(default)]
  pub format:      FormatPreference,
  #[serde(default)]
  pub skill_level: SkillPreference,
}

impl Preferences {
  /// A record expressing no preference at all.
  pub fn none(viewer_id: Uuid) -> Self {
    Self {
      viewer_id,
      region: None,
      format: FormatPreference::Any,
      skill_level: SkillPreference::All,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
