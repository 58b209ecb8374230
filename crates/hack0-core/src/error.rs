//! Error types for `hack0-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("organization not found: {0}")]
  OrganizationNotFound(Uuid),

  #[error("event not found: {0}")]
  EventNotFound(Uuid),

  /// An imported event must carry the UID of its originating calendar
  /// entry; upserts are keyed on it.
  #[error("imported event has no source uid")]
  MissingSourceUid,

  #[error("unknown event type: {0:?}")]
  UnknownEventType(String),

  #[error("unknown event status: {0:?}")]
  UnknownEventStatus(String),

  #[error("unknown event format: {0:?}")]
  UnknownEventFormat(String),

  #[error("unknown skill level: {0:?}")]
  UnknownSkillLevel(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
