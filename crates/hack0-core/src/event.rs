//! Event types — the fundamental unit of the hack0 directory.
//!
//! Events are published by organizations and consumed read-only by the
//! feed ranker. Every field a scoring rule depends on is optional; a rule
//! whose field is absent simply contributes nothing.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uuid::Uuid;

use crate::{Error, org::Organizer};

// ─── Event type and category buckets ─────────────────────────────────────────

/// The kind of event. Each variant belongs to exactly one
/// [`EventCategory`]; the feed's category filters select over these
/// buckets.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
  // Competitions
  Hackathon,
  Olympiad,
  Competition,
  Robotics,

  // Learning
  Workshop,
  Bootcamp,
  Course,
  Certification,
  SummerSchool,

  // Community
  Meetup,
  Networking,
  Conference,
  Seminar,
}

/// The three fixed event-type groupings the feed filter selects over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
  Competitions,
  Learning,
  Community,
}

impl EventType {
  /// The category bucket this type belongs to. Total — every type is in
  /// exactly one bucket.
  pub fn category(self) -> EventCategory {
    match self {
      Self::Hackathon | Self::Olympiad | Self::Competition | Self::Robotics => {
        EventCategory::Competitions
      }
      Self::Workshop
      | Self::Bootcamp
      | Self::Course
      | Self::Certification
      | Self::SummerSchool => EventCategory::Learning,
      Self::Meetup | Self::Networking | Self::Conference | Self::Seminar => {
        EventCategory::Community
      }
    }
  }
}

impl FromStr for EventType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "hackathon" => Ok(Self::Hackathon),
      "olympiad" => Ok(Self::Olympiad),
      "competition" => Ok(Self::Competition),
      "robotics" => Ok(Self::Robotics),
      "workshop" => Ok(Self::Workshop),
      "bootcamp" => Ok(Self::Bootcamp),
      "course" => Ok(Self::Course),
      "certification" => Ok(Self::Certification),
      "summer_school" => Ok(Self::SummerSchool),
      "meetup" => Ok(Self::Meetup),
      "networking" => Ok(Self::Networking),
      "conference" => Ok(Self::Conference),
      "seminar" => Ok(Self::Seminar),
      other => Err(Error::UnknownEventType(other.to_string())),
    }
  }
}

// ─── Lifecycle status ────────────────────────────────────────────────────────

/// Where an event is in its publication lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
  Draft,
  Upcoming,
  /// Registration is open.
  Open,
  Ongoing,
  Ended,
}

impl FromStr for EventStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "draft" => Ok(Self::Draft),
      "upcoming" => Ok(Self::Upcoming),
      "open" => Ok(Self::Open),
      "ongoing" => Ok(Self::Ongoing),
      "ended" => Ok(Self::Ended),
      other => Err(Error::UnknownEventStatus(other.to_string())),
    }
  }
}

// ─── Attendance format ───────────────────────────────────────────────────────

/// How attendees participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum EventFormat {
  Virtual,
  InPerson,
  Hybrid,
}

impl FromStr for EventFormat {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s {
      "virtual" => Ok(Self::Virtual),
      "in-person" => Ok(Self::InPerson),
      "hybrid" => Ok(Self::Hybrid),
      other => Err(Error::UnknownEventFormat(other.to_string())),
    }
  }
}

// ─── Skill level ─────────────────────────────────────────────────────────────

/// The audience an event targets. `All` means it welcomes every level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SkillLevel {
  Beginner,
  Intermediate,
  Advanced,
  All,
}

impl FromStr for SkillLevel {
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

// ─── Event ───────────────────────────────────────────────────────────────────

/// A published event with its organizer reference embedded.
///
/// The ranker treats this as an immutable, externally-supplied read model;
/// nothing in this crate ever mutates one. Invariant (assumed valid
/// upstream, not enforced here): `end_at >= start_at` when both are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
  pub event_id:       Uuid,
  pub title:          String,
  pub description:    Option<String>,
  pub url:            Option<String>,
  pub organizer:      Option<Organizer>,
  pub event_type:     EventType,
  pub status:         Option<EventStatus>,
  pub start_at:       Option<DateTime<Utc>>,
  pub end_at:         Option<DateTime<Utc>>,
  pub country:        Option<String>,
  /// Department / region within the country.
  pub region:         Option<String>,
  pub format:         Option<EventFormat>,
  pub skill_level:    Option<SkillLevel>,
  pub prize_pool:     Option<i64>,
  pub prize_currency: Option<String>,
  /// UID of the originating calendar entry, for imported events.
  pub source_uid:     Option<String>,
  /// Content hash of the imported entry; unchanged hash ⇒ re-import skips.
  pub import_digest:  Option<String>,
  /// Server-assigned; the feed's pagination cursor is keyed on this.
  pub created_at:     DateTime<Utc>,
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::DirectoryStore::add_event`].
/// `event_id` and `created_at` are assigned by the store; the organizer
/// reference is resolved from `org_id` on read.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
  pub title:          String,
  pub description:    Option<String>,
  pub url:            Option<String>,
  pub org_id:         Option<Uuid>,
  pub event_type:     EventType,
  pub status:         Option<EventStatus>,
  pub start_at:       Option<DateTime<Utc>>,
  pub end_at:         Option<DateTime<Utc>>,
  pub country:        Option<String>,
  pub region:         Option<String>,
  pub format:         Option<EventFormat>,
  pub skill_level:    Option<SkillLevel>,
  pub prize_pool:     Option<i64>,
  pub prize_currency: Option<String>,
  #[serde(default)]
  pub source_uid:     Option<String>,
  #[serde(default)]
  pub import_digest:  Option<String>,
}

impl NewEvent {
  /// Convenience constructor with all optional fields unset.
  pub fn new(title: impl Into<String>, event_type: EventType) -> Self {
    Self {
      title: title.into(),
      description: None,
      url: None,
      org_id: None,
      event_type,
      status: None,
      start_at: None,
      end_at: None,
      country: None,
      region: None,
      format: None,
      skill_level: None,
      prize_pool: None,
      prize_currency: None,
      source_uid: None,
      import_digest: None,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
