//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings (which also makes the
//! feed cursor's `created_at < ?` a plain text comparison). Enums are
//! stored as their canonical string forms. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, Utc};
use hack0_core::{
  event::{Event, EventFormat, EventStatus, EventType, SkillLevel},
  org::{Organization, Organizer},
  preferences::{FormatPreference, Preferences, SkillPreference},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────
//
// The encode direction is the enums' `Display` impls; the decode
// direction goes through their `FromStr` impls, whose errors name the
// offending string.

pub fn decode_event_type(s: &str) -> Result<EventType> {
  Ok(s.parse::<EventType>()?)
}

pub fn decode_status(s: &str) -> Result<EventStatus> {
  Ok(s.parse::<EventStatus>()?)
}

pub fn decode_format(s: &str) -> Result<EventFormat> {
  Ok(s.parse::<EventFormat>()?)
}

pub fn decode_skill_level(s: &str) -> Result<SkillLevel> {
  Ok(s.parse::<SkillLevel>()?)
}

pub fn decode_format_preference(s: &str) -> Result<FormatPreference> {
  Ok(s.parse::<FormatPreference>()?)
}

pub fn decode_skill_preference(s: &str) -> Result<SkillPreference> {
  Ok(s.parse::<SkillPreference>()?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `organizations` row.
pub struct RawOrganization {
  pub org_id:      String,
  pub name:        String,
  pub country:     Option<String>,
  pub is_verified: bool,
  pub created_at:  String,
}

impl RawOrganization {
  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      org_id:      decode_uuid(&self.org_id)?,
      name:        self.name,
      country:     self.country,
      is_verified: self.is_verified,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from an `events` row left-joined with its
/// organization.
pub struct RawEvent {
  pub event_id:       String,
  pub title:          String,
  pub description:    Option<String>,
  pub url:            Option<String>,
  pub org_id:         Option<String>,
  pub event_type:     String,
  pub status:         Option<String>,
  pub start_at:       Option<String>,
  pub end_at:         Option<String>,
  pub country:        Option<String>,
  pub region:         Option<String>,
  pub format:         Option<String>,
  pub skill_level:    Option<String>,
  pub prize_pool:     Option<i64>,
  pub prize_currency: Option<String>,
  pub source_uid:     Option<String>,
  pub import_digest:  Option<String>,
  pub created_at:     String,
  // organizations join
  pub org_name:       Option<String>,
  pub org_verified:   Option<bool>,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    let organizer = match (&self.org_id, self.org_name) {
      (Some(id), Some(name)) => Some(Organizer {
        org_id:      decode_uuid(id)?,
        name,
        is_verified: self.org_verified.unwrap_or(false),
      }),
      _ => None,
    };

    Ok(Event {
      event_id:       decode_uuid(&self.event_id)?,
      title:          self.title,
      description:    self.description,
      url:            self.url,
      organizer,
      event_type:     decode_event_type(&self.event_type)?,
      status:         self.status.as_deref().map(decode_status).transpose()?,
      start_at:       self.start_at.as_deref().map(decode_dt).transpose()?,
      end_at:         self.end_at.as_deref().map(decode_dt).transpose()?,
      country:        self.country,
      region:         self.region,
      format:         self.format.as_deref().map(decode_format).transpose()?,
      skill_level:    self
        .skill_level
        .as_deref()
        .map(decode_skill_level)
        .transpose()?,
      prize_pool:     self.prize_pool,
      prize_currency: self.prize_currency,
      source_uid:     self.source_uid,
      import_digest:  self.import_digest,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `preferences` row.
pub struct RawPreferences {
  pub viewer_id:   String,
  pub region:      Option<String>,
  pub format:      String,
  pub skill_level: String,
}

impl RawPreferences {
  pub fn into_preferences(self) -> Result<Preferences> {
    Ok(Preferences {
      viewer_id:   decode_uuid(&self.viewer_id)?,
      region:      self.region,
      format:      decode_format_preference(&self.format)?,
      skill_level: decode_skill_preference(&self.skill_level)?,
    })
  }
}
