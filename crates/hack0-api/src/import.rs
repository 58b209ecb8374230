//! Handler for `POST /import/ical` — calendar-feed ingestion.
//!
//! The body is raw `text/calendar` content. Each `VEVENT` is upserted
//! under the given organization, keyed on its UID; entries whose content
//! digest is unchanged are skipped without a write.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::{DateTime, Utc};
use hack0_core::{
  event::EventStatus,
  store::{DirectoryStore, ImportOutcome},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ImportParams {
  /// The organization the imported events belong to.
  pub organization_id: Uuid,
  /// Human-readable feed name, for the log line only.
  pub source:          Option<String>,
}

/// Per-outcome counts reported back to the importer.
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
  pub created:   usize,
  pub updated:   usize,
  pub unchanged: usize,
  /// Malformed event blocks that were passed over.
  pub skipped:   usize,
}

/// Calendars carry no draft/open lifecycle, so an imported event without
/// an explicit status gets one derived from its dates.
fn derive_status(
  start: Option<DateTime<Utc>>,
  end: Option<DateTime<Utc>>,
  now: DateTime<Utc>,
) -> Option<EventStatus> {
  if let Some(end) = end
    && end < now
  {
    return Some(EventStatus::Ended);
  }
  match start {
    Some(start) if start > now => Some(EventStatus::Upcoming),
    Some(_) => Some(EventStatus::Ongoing),
    None => None,
  }
}

/// `POST /import/ical?organization_id=…[&source=…]` — body: `text/calendar`.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ImportParams>,
  body: String,
) -> Result<Json<ImportReport>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let org_id = params.organization_id;
  store
    .get_organization(org_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("organization {org_id} not found"))
    })?;

  let parsed = hack0_ical::parse_calendar(&body)
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let now = Utc::now();
  let mut report = ImportReport::default();

  for entry in parsed {
    let mut event = match entry {
      Ok(parsed) => parsed.event,
      Err(e) => {
        tracing::warn!(error = %e, "skipping malformed calendar entry");
        report.skipped += 1;
        continue;
      }
    };

    event.org_id = Some(org_id);
    if event.status.is_none() {
      event.status = derive_status(event.start_at, event.end_at, now);
    }

    let (_, outcome) = store
      .upsert_imported_event(event)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;

    match outcome {
      ImportOutcome::Created => report.created += 1,
      ImportOutcome::Updated => report.updated += 1,
      ImportOutcome::Unchanged => report.unchanged += 1,
    }
  }

  tracing::info!(
    organization = %org_id,
    source = params.source.as_deref().unwrap_or("-"),
    created = report.created,
    updated = report.updated,
    unchanged = report.unchanged,
    skipped = report.skipped,
    "calendar import finished"
  );

  Ok(Json(report))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  #[test]
  fn derive_status_from_dates() {
    let now = Utc::now();
    let soon = Some(now + Duration::days(1));
    let earlier = Some(now - Duration::days(1));
    let later = Some(now + Duration::days(2));

    assert_eq!(derive_status(soon, later, now), Some(EventStatus::Upcoming));
    assert_eq!(
      derive_status(earlier, later, now),
      Some(EventStatus::Ongoing)
    );
    assert_eq!(
      derive_status(earlier, Some(now - Duration::hours(1)), now),
      Some(EventStatus::Ended)
    );
    assert_eq!(derive_status(earlier, None, now), Some(EventStatus::Ongoing));
    assert_eq!(derive_status(None, None, now), None);
  }
}
