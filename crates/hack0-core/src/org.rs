//! Organizations — the communities that publish events.
//!
//! An organization is a thin record; everything interesting about it for
//! ranking purposes (the verified flag, the display name) travels embedded
//! in each event as an [`Organizer`] so the feed never needs a second
//! lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A community that publishes events to the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
  pub org_id:      Uuid,
  pub name:        String,
  pub country:     Option<String>,
  /// One-way flag flipped by an admin operation once the community's
  /// claim has been approved.
  pub is_verified: bool,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::DirectoryStore::add_organization`].
/// `org_id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
  pub name:    String,
  pub country: Option<String>,
}

/// The organization reference embedded in each [`Event`](crate::event::Event).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
  pub org_id:      Uuid,
  pub name:        String,
  pub is_verified: bool,
}
