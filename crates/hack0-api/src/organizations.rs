//! Handlers for `/organizations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/organizations` | All organizations, newest first |
//! | `POST` | `/organizations` | Body: [`NewOrganization`] |
//! | `GET`  | `/organizations/{id}` | 404 if not found |
//! | `POST` | `/organizations/{id}/verify` | Body: `{"verified":true}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use hack0_core::{
  org::{NewOrganization, Organization},
  store::DirectoryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /organizations`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let orgs = store
    .list_organizations()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(orgs))
}

/// `POST /organizations` — body: `{"name":"…","country":"…"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewOrganization>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let org = store
    .add_organization(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(org)))
}

/// `GET /organizations/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Organization>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let org = store
    .get_organization(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("organization {id} not found")))?;
  Ok(Json(org))
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub verified: bool,
}

/// `POST /organizations/{id}/verify` — body: `{"verified":true}`
pub async fn verify<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<VerifyBody>,
) -> Result<Json<Organization>, ApiError>
where
  S: DirectoryStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_organization(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("organization {id} not found")))?;

  let org = store
    .set_verified(id, body.verified)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(org))
}
