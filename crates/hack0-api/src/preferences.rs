//! Handlers for `/viewers/{viewer_id}/preferences` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/viewers/{viewer_id}/preferences` | 404 when never set |
//! | `PUT`  | `/viewers/{viewer_id}/preferences` | Upsert; omitted fields mean "no preference" |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use hack0_core::{
  preferences::{FormatPreference, Preferences, SkillPreference},
  store::DirectoryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /viewers/{viewer_id}/preferences`
pub async fn get_prefs<S>(
  State(store): State<Arc<S>>,
  Path(viewer_id): Path<Uuid>,
) -> Result<Json<Preferences>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let prefs = store
    .get_preferences(viewer_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no preferences for viewer {viewer_id}"))
    })?;
  Ok(Json(prefs))
}

/// JSON body accepted by `PUT /viewers/{viewer_id}/preferences`.
/// The viewer id comes from the path, never the body.
#[derive(Debug, Deserialize)]
pub struct PreferencesBody {
  pub region:      Option<String>,
  #[serde(default)]
  pub format:      FormatPreference,
  #[serde(default)]
  pub skill_level: SkillPreference,
}

/// `PUT /viewers/{viewer_id}/preferences`
pub async fn set_prefs<S>(
  State(store): State<Arc<S>>,
  Path(viewer_id): Path<Uuid>,
  Json(body): Json<PreferencesBody>,
) -> Result<Json<Preferences>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let prefs = Preferences {
    viewer_id,
    region: body.region,
    format: body.format,
    skill_level: body.skill_level,
  };

  let stored = store
    .set_preferences(prefs)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stored))
}
