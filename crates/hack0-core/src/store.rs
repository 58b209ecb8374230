//! The `DirectoryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `hack0-store-sqlite`). Higher layers (`hack0-api`, the feed ranker)
//! depend on this abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  event::{Event, EventStatus, NewEvent},
  org::{NewOrganization, Organization},
  preferences::Preferences,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`DirectoryStore::fetch_events`].
///
/// Results are always ordered by `created_at` descending with the
/// organizer reference embedded; the feed's keyset pagination depends on
/// that ordering.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Only events created strictly before this instant.
  pub created_before: Option<DateTime<Utc>>,
  /// Only events whose `end_at` is at or after this instant, or null.
  pub min_end_at:     Option<DateTime<Utc>>,
  /// Maximum number of rows returned. Zero means zero rows.
  pub limit:          usize,
}

// ─── Import outcome ──────────────────────────────────────────────────────────

/// What [`DirectoryStore::upsert_imported_event`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportOutcome {
  Created,
  Updated,
  /// The stored `import_digest` matched; nothing was written.
  Unchanged,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a hack0 directory backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Create and persist a new organization. Unverified until an admin
  /// flips the flag.
  fn add_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  /// Retrieve an organization by UUID. Returns `None` if not found.
  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  /// List all organizations.
  fn list_organizations(
    &self,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  /// Set the verified flag. Returns the updated record; errors if the
  /// organization does not exist.
  fn set_verified(
    &self,
    id: Uuid,
    verified: bool,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Persist a new event. `event_id` and `created_at` are set by the
  /// store.
  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Retrieve an event (organizer embedded). Returns `None` if not found.
  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Fetch candidate events for the feed, newest first.
  fn fetch_events<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + 'a;

  /// Move an event through its lifecycle. Errors if the event does not
  /// exist.
  fn set_event_status(
    &self,
    id: Uuid,
    status: EventStatus,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Insert or refresh an imported event, keyed on
  /// `(org_id, source_uid)`. A matching stored `import_digest` skips the
  /// write. Errors if `input.source_uid` is `None`.
  fn upsert_imported_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<(Event, ImportOutcome), Self::Error>> + Send + '_;

  // ── Follows ───────────────────────────────────────────────────────────

  /// Record that a viewer follows an organization. Idempotent; errors if
  /// the organization does not exist.
  fn follow(
    &self,
    viewer_id: Uuid,
    org_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a follow edge. Idempotent — removing a non-existent edge is
  /// not an error.
  fn unfollow(
    &self,
    viewer_id: Uuid,
    org_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The set of organization ids the viewer follows.
  fn followed_organizations(
    &self,
    viewer_id: Uuid,
  ) -> impl Future<Output = Result<HashSet<Uuid>, Self::Error>> + Send + '_;

  // ── Preferences ───────────────────────────────────────────────────────

  /// Upsert a viewer's preferences record.
  fn set_preferences(
    &self,
    prefs: Preferences,
  ) -> impl Future<Output = Result<Preferences, Self::Error>> + Send + '_;

  /// Retrieve a viewer's preferences. `None` means "no preference".
  fn get_preferences(
    &self,
    viewer_id: Uuid,
  ) -> impl Future<Output = Result<Option<Preferences>, Self::Error>> + Send + '_;
}
