//! Handler for `GET /feed` — the personalized feed.
//!
//! The viewer is identified by the `X-Viewer-Id` header (authentication
//! is delegated upstream; this service trusts the header). No header
//! means an anonymous request and yields an empty page by policy, not an
//! error.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::HeaderMap,
};
use chrono::{DateTime, Utc};
use hack0_core::{
  feed::{DEFAULT_LIMIT, FeedFilter, FeedOptions, FeedPage, rank_feed},
  store::DirectoryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

pub(crate) const VIEWER_HEADER: &str = "x-viewer-id";

#[derive(Debug, Deserialize, Default)]
pub struct FeedParams {
  /// Output page size; defaults to 20.
  pub limit:         Option<usize>,
  /// `created_at` of the last event of the previous page (RFC 3339).
  pub cursor:        Option<DateTime<Utc>>,
  #[serde(default)]
  pub include_ended: bool,
  /// `all | following | competitions | learning | community`;
  /// unrecognized values fall back to `all`.
  pub filter:        Option<String>,
}

/// Extract the viewer id from `X-Viewer-Id`, if present.
pub(crate) fn viewer_from_headers(
  headers: &HeaderMap,
) -> Result<Option<Uuid>, ApiError> {
  let Some(value) = headers.get(VIEWER_HEADER) else {
    return Ok(None);
  };
  let value = value
    .to_str()
    .map_err(|_| ApiError::BadRequest("X-Viewer-Id is not valid UTF-8".into()))?;
  Uuid::parse_str(value)
    .map(Some)
    .map_err(|_| ApiError::BadRequest(format!("invalid X-Viewer-Id: {value:?}")))
}

/// `GET /feed[?limit=…][&cursor=…][&include_ended=true][&filter=…]`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  headers: HeaderMap,
  Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let viewer = viewer_from_headers(&headers)?;

  let options = FeedOptions {
    limit:         params.limit.unwrap_or(DEFAULT_LIMIT),
    cursor:        params.cursor,
    include_ended: params.include_ended,
    filter:        params
      .filter
      .as_deref()
      .map(|s| s.parse::<FeedFilter>().unwrap_or_default())
      .unwrap_or_default(),
  };

  let page = rank_feed(store.as_ref(), viewer, &options)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::debug!(
    viewer = ?viewer,
    filter = options.filter.as_str(),
    returned = page.events.len(),
    has_more = page.has_more,
    "feed page served"
  );

  Ok(Json(page))
}
