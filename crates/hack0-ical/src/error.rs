//! Error types for the hack0-ical codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("calendar missing BEGIN/END:VCALENDAR envelope")]
  MissingEnvelope,

  #[error("event block missing END:VEVENT")]
  UnterminatedEvent,

  #[error("malformed content-line: {0}")]
  MalformedContentLine(String),

  /// Upserts are keyed on the UID, so an event without one cannot be
  /// imported.
  #[error("event is missing a UID")]
  MissingUid,

  #[error("invalid date in {property}: {value}")]
  InvalidDate { property: String, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
