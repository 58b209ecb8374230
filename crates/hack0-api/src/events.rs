//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Optional `limit`, `created_before`, `include_ended` |
//! | `POST` | `/events` | Body: [`NewEvent`]; returns 201 + stored event |
//! | `GET`  | `/events/{id}` | 404 if not found |
//! | `POST` | `/events/{id}/status` | Body: `{"status":"open"}` |
//! | `GET`  | `/events.ics` | Calendar export of recent events |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use hack0_core::{
  event::{Event, EventStatus, NewEvent},
  store::{DirectoryStore, EventQuery},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

const DEFAULT_LIST_LIMIT: usize = 50;
const EXPORT_LIMIT: usize = 200;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub limit:          Option<usize>,
  pub created_before: Option<DateTime<Utc>>,
  #[serde(default)]
  pub include_ended:  bool,
}

impl ListParams {
  fn into_query(self, now: DateTime<Utc>) -> EventQuery {
    EventQuery {
      created_before: self.created_before,
      min_end_at:     (!self.include_ended).then_some(now),
      limit:          self.limit.unwrap_or(DEFAULT_LIST_LIMIT),
    }
  }
}

/// `GET /events[?limit=…][&created_before=…][&include_ended=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = params.into_query(Utc::now());
  let events = store
    .fetch_events(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(events))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /events` — returns 201 + the stored [`Event`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewEvent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let event = store
    .add_event(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /events/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Event>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let event = store
    .get_event(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(event))
}

// ─── Status transition ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: EventStatus,
}

/// `POST /events/{id}/status` — body: `{"status":"open"}`
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Event>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // Existence check first so an unknown id is a 404, not a store error.
  store
    .get_event(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;

  let event = store
    .set_event_status(id, body.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(event))
}

// ─── Calendar export ──────────────────────────────────────────────────────────

/// `GET /events.ics` — the directory as a subscribable calendar feed.
pub async fn export<S>(
  State(store): State<Arc<S>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = EventQuery {
    created_before: None,
    min_end_at:     Some(Utc::now()),
    limit:          EXPORT_LIMIT,
  };
  let events = store
    .fetch_events(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let ics = hack0_ical::serialize_calendar(&events);
  Ok((
    [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
    ics,
  ))
}
