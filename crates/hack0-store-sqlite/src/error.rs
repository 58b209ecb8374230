//! Error type for `hack0-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] hack0_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("organization not found: {0}")]
  OrganizationNotFound(uuid::Uuid),

  #[error("event not found: {0}")]
  EventNotFound(uuid::Uuid),

  /// Attempted an import upsert without a source uid to key on.
  #[error("imported event has no source uid")]
  MissingSourceUid,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
