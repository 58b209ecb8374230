//! iCalendar serializer.
//!
//! Produces CRLF line endings and folds at 75 octets per RFC 5545 §3.1,
//! so the directory can be subscribed to as a standard calendar feed.

use chrono::{DateTime, Utc};
use hack0_core::event::Event;

// ─── RFC 5545 line folding ───────────────────────────────────────────────────

/// Emit `s` as one logical line, folding at 75 octets with CRLF + SP
/// continuation.
pub(crate) fn fold_line(s: &str) -> String {
  if s.len() <= 75 {
    return format!("{}\r\n", s);
  }

  let mut result = String::new();
  let total = s.len();
  let mut pos = 0usize;
  let mut first = true;

  while pos < total {
    let limit = if first { 75 } else { 74 };
    let end = if pos + limit >= total {
      total
    } else {
      // Walk back to the nearest valid UTF-8 char boundary
      let mut e = pos + limit;
      while e > pos && !s.is_char_boundary(e) {
        e -= 1;
      }
      // Guarantee at least one byte per segment
      if e == pos { pos + 1 } else { e }
    };

    if !first {
      result.push(' ');
    }
    result.push_str(&s[pos..end]);
    result.push_str("\r\n");
    pos = end;
    first = false;
  }

  result
}

// ─── Value escaping ──────────────────────────────────────────────────────────

/// Escape a property value: `\`, `,`, `;`, newline.
fn escape_value(s: &str) -> String {
  s.replace('\\', "\\\\")
    .replace(',', "\\,")
    .replace(';', "\\;")
    .replace('\n', "\\n")
}

fn format_utc(dt: DateTime<Utc>) -> String {
  dt.format("%Y%m%dT%H%M%SZ").to_string()
}

// ─── Serializer ──────────────────────────────────────────────────────────────

fn push_prop(out: &mut String, name: &str, value: &str) {
  out.push_str(&fold_line(&format!("{name}:{value}")));
}

fn serialize_event(out: &mut String, event: &Event) {
  out.push_str("BEGIN:VEVENT\r\n");

  let uid = event
    .source_uid
    .clone()
    .unwrap_or_else(|| format!("{}@hack0", event.event_id));
  push_prop(out, "UID", &uid);
  push_prop(out, "DTSTAMP", &format_utc(event.created_at));
  push_prop(out, "SUMMARY", &escape_value(&event.title));

  if let Some(description) = &event.description {
    push_prop(out, "DESCRIPTION", &escape_value(description));
  }
  if let Some(url) = &event.url {
    push_prop(out, "URL", url);
  }

  let location = match (event.region.as_deref(), event.country.as_deref()) {
    (Some(region), Some(country)) => Some(format!("{region}, {country}")),
    (Some(region), None) => Some(region.to_string()),
    (None, Some(country)) => Some(country.to_string()),
    (None, None) => None,
  };
  if let Some(location) = location {
    push_prop(out, "LOCATION", &escape_value(&location));
  }

  if let Some(start) = event.start_at {
    push_prop(out, "DTSTART", &format_utc(start));
  }
  if let Some(end) = event.end_at {
    push_prop(out, "DTEND", &format_utc(end));
  }

  push_prop(
    out,
    "CATEGORIES",
    &event.event_type.to_string().to_uppercase(),
  );

  if let Some(status) = event.status {
    push_prop(out, "X-HACK0-STATUS", &status.to_string());
  }
  if let Some(format) = event.format {
    push_prop(out, "X-HACK0-FORMAT", &format.to_string());
  }
  if let Some(level) = event.skill_level {
    push_prop(out, "X-HACK0-SKILL-LEVEL", &level.to_string());
  }
  if let Some(prize) = event.prize_pool {
    push_prop(out, "X-HACK0-PRIZE-POOL", &prize.to_string());
  }
  if let Some(currency) = &event.prize_currency {
    push_prop(out, "X-HACK0-PRIZE-CURRENCY", currency);
  }

  out.push_str("END:VEVENT\r\n");
}

/// Serialize `events` as a `VCALENDAR` with one `VEVENT` each.
pub fn serialize_calendar(events: &[Event]) -> String {
  let mut out = String::new();
  out.push_str("BEGIN:VCALENDAR\r\n");
  out.push_str("VERSION:2.0\r\n");
  out.push_str("PRODID:-//hack0//events directory//EN\r\n");
  for event in events {
    serialize_event(&mut out, event);
  }
  out.push_str("END:VCALENDAR\r\n");
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn short_lines_are_left_alone() {
    assert_eq!(fold_line("SUMMARY:short"), "SUMMARY:short\r\n");
  }

  #[test]
  fn long_lines_fold_at_75_octets() {
    let line = format!("DESCRIPTION:{}", "x".repeat(200));
    let folded = fold_line(&line);
    for physical in folded.split("\r\n").filter(|l| !l.is_empty()) {
      assert!(physical.len() <= 75, "physical line too long: {physical}");
    }
    // Unfolding restores the logical line.
    let unfolded = folded.replace("\r\n ", "").replace("\r\n", "");
    assert_eq!(unfolded, line);
  }

  #[test]
  fn values_are_escaped() {
    assert_eq!(escape_value("a,b;c\nd"), "a\\,b\\;c\\nd");
  }
}
