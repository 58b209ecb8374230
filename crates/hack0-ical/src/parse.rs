//! iCalendar (RFC 5545) content-line parser.
//!
//! Pipeline:
//!   raw &str
//!     └─ unfold_lines()          → Vec<String>
//!          └─ event blocks       → BEGIN:VEVENT … END:VEVENT slices
//!               └─ parse_vevent() → ParsedEvent (NewEvent + uid + digest)

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use hack0_core::event::{EventFormat, EventStatus, EventType, NewEvent, SkillLevel};
use sha2::{Digest, Sha256};

use crate::{
  ParsedEvent,
  error::{Error, Result},
};

// ─── Content-line representation ─────────────────────────────────────────────

struct ContentLine {
  name:   String,
  params: Vec<Param>,
  value:  String,
}

struct Param {
  name:  String,
  value: String,
}

// ─── Low-level helpers ───────────────────────────────────────────────────────

/// Join CRLF+SP (or LF+SP / LF+HT) continuation lines (RFC 5545 §3.1).
/// Tolerates bare LF line endings for real-world robustness.
pub(crate) fn unfold_lines(s: &str) -> Vec<String> {
  let mut lines: Vec<String> = Vec::new();
  for raw in s.split('\n') {
    let line = raw.strip_suffix('\r').unwrap_or(raw);
    if line.starts_with(' ') || line.starts_with('\t') {
      if let Some(last) = lines.last_mut() {
        last.push_str(&line[1..]);
      }
      // else: leading continuation with no prior line — discard
    } else {
      lines.push(line.to_string());
    }
  }
  lines.retain(|l| !l.is_empty());
  lines
}

/// Find the first `:` that is not inside a double-quoted string.
fn find_unquoted_colon(s: &str) -> Option<usize> {
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ':' if !in_quotes => return Some(i),
      _ => {}
    }
  }
  None
}

/// Split on `;` while respecting double-quoted strings.
fn split_semicolons_respecting_quotes(s: &str) -> Vec<&str> {
  let mut result = Vec::new();
  let mut start = 0usize;
  let mut in_quotes = false;
  for (i, c) in s.char_indices() {
    match c {
      '"' => in_quotes = !in_quotes,
      ';' if !in_quotes => {
        result.push(&s[start..i]);
        start = i + 1;
      }
      _ => {}
    }
  }
  result.push(&s[start..]);
  result
}

fn parse_content_line(line: &str) -> Result<ContentLine> {
  let colon_pos = find_unquoted_colon(line)
    .ok_or_else(|| Error::MalformedContentLine(line.to_string()))?;

  let name_part = &line[..colon_pos];
  let value = line[colon_pos + 1..].to_string();

  let tokens = split_semicolons_respecting_quotes(name_part);
  if tokens.is_empty() || tokens[0].is_empty() {
    return Err(Error::MalformedContentLine(line.to_string()));
  }

  let name = tokens[0].to_uppercase();

  let mut params = Vec::new();
  for token in &tokens[1..] {
    if let Some(eq_pos) = token.find('=') {
      params.push(Param {
        name:  token[..eq_pos].trim().to_uppercase(),
        value: token[eq_pos + 1..].trim().trim_matches('"').to_string(),
      });
    }
  }

  Ok(ContentLine {
    name,
    params,
    value,
  })
}

// ─── Value helpers ───────────────────────────────────────────────────────────

fn unescape_value(s: &str) -> String {
  let mut result = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c == '\\' {
      match chars.next() {
        Some('n') | Some('N') => result.push('\n'),
        Some('\\') => result.push('\\'),
        Some(',') => result.push(','),
        Some(';') => result.push(';'),
        Some(other) => {
          result.push('\\');
          result.push(other);
        }
        None => result.push('\\'),
      }
    } else {
      result.push(c);
    }
  }
  result
}

/// Return `Some(trimmed)` when non-empty, `None` otherwise.
fn opt_str(s: &str) -> Option<String> {
  let s = s.trim();
  if s.is_empty() {
    None
  } else {
    Some(s.to_string())
  }
}

fn has_date_param(params: &[Param]) -> bool {
  params.iter().any(|p| {
    p.name.eq_ignore_ascii_case("VALUE") && p.value.eq_ignore_ascii_case("DATE")
  })
}

/// Parse the RFC 5545 date-time forms:
/// `YYYYMMDDTHHMMSSZ` (UTC), `YYYYMMDDTHHMMSS` (floating, read as UTC),
/// and bare `YYYYMMDD` (midnight UTC). Any `TZID` parameter is ignored —
/// the feeds this directory ingests publish UTC.
fn parse_ics_datetime(
  property: &str,
  value: &str,
  date_only: bool,
) -> Result<DateTime<Utc>> {
  let value = value.trim();

  if date_only || value.len() == 8 {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y%m%d") {
      return Ok(Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)));
    }
  }

  if let Some(stripped) = value.strip_suffix('Z') {
    if let Ok(dt) = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S") {
      return Ok(Utc.from_utc_datetime(&dt));
    }
  } else if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
    return Ok(Utc.from_utc_datetime(&dt));
  }

  Err(Error::InvalidDate {
    property: property.to_string(),
    value:    value.to_string(),
  })
}

/// Map a CATEGORIES token to an [`EventType`]. Tokens are lowercased with
/// spaces and hyphens normalized to underscores, so `Summer School`
/// matches `summer_school`.
fn category_to_event_type(token: &str) -> Option<EventType> {
  let normalized = token.trim().to_lowercase().replace([' ', '-'], "_");
  normalized.parse::<EventType>().ok()
}

/// Split a LOCATION value into (region, country). A single component is a
/// region; with several, the first is the region and the last the country.
fn split_location(value: &str) -> (Option<String>, Option<String>) {
  let parts: Vec<&str> = value.split(',').map(str::trim).collect();
  match parts.as_slice() {
    [] | [""] => (None, None),
    [only] => (opt_str(only), None),
    [first, .., last] => (opt_str(first), opt_str(last)),
  }
}

/// SHA-256 over the normalized (unfolded) content lines of one event
/// block. Stable across re-folding and line-ending differences, so an
/// unchanged upstream entry re-imports as a no-op.
fn digest_lines(lines: &[String]) -> String {
  let mut hasher = Sha256::new();
  for line in lines {
    hasher.update(line.as_bytes());
    hasher.update(b"\n");
  }
  hex::encode(hasher.finalize())
}

// ─── VEVENT parser ───────────────────────────────────────────────────────────

/// Parse one unfolded `BEGIN:VEVENT … END:VEVENT` slice (exclusive of the
/// envelope lines). Returns `None` for cancelled events.
pub(crate) fn parse_vevent(lines: &[String]) -> Result<Option<ParsedEvent>> {
  let mut uid: Option<String> = None;
  let mut event = NewEvent::new("(untitled)", EventType::Meetup);
  let mut in_alarm = false;

  for line in lines {
    // Skip embedded VALARM components wholesale.
    if line.eq_ignore_ascii_case("BEGIN:VALARM") {
      in_alarm = true;
      continue;
    }
    if line.eq_ignore_ascii_case("END:VALARM") {
      in_alarm = false;
      continue;
    }
    if in_alarm {
      continue;
    }

    let cl = match parse_content_line(line) {
      Ok(cl) => cl,
      Err(_) => continue, // skip malformed lines
    };

    match cl.name.as_str() {
      "UID" => uid = opt_str(&cl.value),

      "SUMMARY" => {
        if let Some(title) = opt_str(&unescape_value(&cl.value)) {
          event.title = title;
        }
      }
      "DESCRIPTION" => {
        event.description = opt_str(&unescape_value(&cl.value));
      }
      "URL" => event.url = opt_str(&cl.value),

      "LOCATION" => {
        let (region, country) = split_location(&unescape_value(&cl.value));
        event.region = region;
        event.country = country;
      }

      "DTSTART" => {
        event.start_at = Some(parse_ics_datetime(
          "DTSTART",
          &cl.value,
          has_date_param(&cl.params),
        )?);
      }
      "DTEND" => {
        event.end_at = Some(parse_ics_datetime(
          "DTEND",
          &cl.value,
          has_date_param(&cl.params),
        )?);
      }

      "CATEGORIES" => {
        if let Some(t) = cl.value.split(',').find_map(category_to_event_type) {
          event.event_type = t;
        }
      }

      "STATUS" => {
        if cl.value.trim().eq_ignore_ascii_case("CANCELLED") {
          return Ok(None);
        }
      }

      // ── hack0 extension properties ────────────────────────────────────
      "X-HACK0-STATUS" => {
        event.status = cl.value.trim().parse::<EventStatus>().ok();
      }
      "X-HACK0-FORMAT" => {
        event.format = cl.value.trim().parse::<EventFormat>().ok();
      }
      "X-HACK0-SKILL-LEVEL" => {
        event.skill_level = cl.value.trim().parse::<SkillLevel>().ok();
      }
      "X-HACK0-PRIZE-POOL" => {
        event.prize_pool = cl.value.trim().parse::<i64>().ok();
      }
      "X-HACK0-PRIZE-CURRENCY" => {
        event.prize_currency = opt_str(&cl.value);
      }

      // Envelope / meta and unknown IANA properties silently skipped.
      _ => {}
    }
  }

  let uid = uid.ok_or(Error::MissingUid)?;
  event.source_uid = Some(uid.clone());
  event.import_digest = Some(digest_lines(lines));

  Ok(Some(ParsedEvent { uid, event }))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
