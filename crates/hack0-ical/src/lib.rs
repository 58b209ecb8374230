//! iCalendar (RFC 5545) codec for hack0.
//!
//! Converts between `.ics` calendar feeds and [`hack0_core`] domain types.
//! Pure synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let ics = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nUID:e1\r\nSUMMARY:Lima \
//!            Hack Night\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
//! for parsed in hack0_ical::parse_calendar(ics).unwrap() {
//!   let parsed = parsed.unwrap();
//!   println!("{}: {}", parsed.uid, parsed.event.title);
//! }
//! ```

pub mod error;
mod parse;
mod serialize;

pub use error::{Error, Result};
use hack0_core::event::NewEvent;
pub use serialize::serialize_calendar;

// ─── Public types ────────────────────────────────────────────────────────────

/// The result of parsing a single `VEVENT`.
pub struct ParsedEvent {
  /// The `UID` property; upserts are keyed on it.
  pub uid:   String,
  /// The decoded event. `org_id` is `None` — the importer assigns the
  /// owning organization. `source_uid` and `import_digest` are filled in.
  pub event: NewEvent,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Parse every `VEVENT` in a calendar.
///
/// Returns one result per event block, in document order, so a malformed
/// block yields `Err(…)` in its position without aborting the rest.
/// Cancelled events are omitted entirely. The only whole-input error is a
/// missing `VCALENDAR` envelope.
pub fn parse_calendar(input: &str) -> Result<Vec<Result<ParsedEvent>>> {
  let lines = parse::unfold_lines(input);

  if !lines
    .iter()
    .any(|l| l.eq_ignore_ascii_case("BEGIN:VCALENDAR"))
  {
    return Err(Error::MissingEnvelope);
  }

  let mut results = Vec::new();
  let mut i = 0;

  while i < lines.len() {
    if lines[i].eq_ignore_ascii_case("BEGIN:VEVENT") {
      let start = i;
      let rel_end = lines[start + 1..]
        .iter()
        .position(|l| l.eq_ignore_ascii_case("END:VEVENT"));

      if let Some(offset) = rel_end {
        let end = start + 1 + offset;
        match parse::parse_vevent(&lines[start + 1..end]) {
          Ok(Some(parsed)) => results.push(Ok(parsed)),
          Ok(None) => {} // cancelled
          Err(e) => results.push(Err(e)),
        }
        i = end + 1;
      } else {
        results.push(Err(Error::UnterminatedEvent));
        break;
      }
    } else {
      i += 1;
    }
  }

  Ok(results)
}

// ─── Round-trip test ─────────────────────────────────────────────────────────
