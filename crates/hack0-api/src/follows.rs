//! Handlers for `/viewers/{viewer_id}/follows` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/viewers/{viewer_id}/follows` | The viewer's follow set |
//! | `PUT`    | `/viewers/{viewer_id}/follows/{org_id}` | Idempotent; 404 for unknown org |
//! | `DELETE` | `/viewers/{viewer_id}/follows/{org_id}` | Idempotent |

use std::{collections::HashSet, sync::Arc};

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use hack0_core::store::DirectoryStore;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /viewers/{viewer_id}/follows`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(viewer_id): Path<Uuid>,
) -> Result<Json<HashSet<Uuid>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let followed = store
    .followed_organizations(viewer_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(followed))
}

/// `PUT /viewers/{viewer_id}/follows/{org_id}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path((viewer_id, org_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if store
    .get_organization(org_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_none()
  {
    return Err(ApiError::NotFound(format!(
      "organization {org_id} not found"
    )));
  }

  store
    .follow(viewer_id, org_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /viewers/{viewer_id}/follows/{org_id}`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path((viewer_id, org_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .unfollow(viewer_id, org_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(StatusCode::NO_CONTENT)
}
