//! Event detail pane — right panel.

use hack0_core::{event::Event, feed::ScoredEvent};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::App;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the detail pane into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(scored) = app.selected_event() else {
    let block = Block::default().title(" Event ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("Event no longer in the feed.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", scored.event.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines: Vec<Line> = Vec::new();
  push_fields(&mut lines, &scored.event, app);
  push_reasons(&mut lines, scored);

  let scroll_offset = app.detail_scroll as u16;
  let para = Paragraph::new(lines).scroll((scroll_offset, 0));
  f.render_widget(para, inner);
}

// ─── Sections ─────────────────────────────────────────────────────────────────

fn field<'a>(label: &'static str, value: String) -> Line<'a> {
  Line::from(vec![
    Span::styled(
      format!("{label:<12}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn push_fields(lines: &mut Vec<Line>, event: &Event, app: &App) {
  if let Some(org) = &event.organizer {
    let mut value = org.name.clone();
    if org.is_verified {
      value.push_str(" ✓");
    }
    if app.followed.contains(&org.org_id) {
      value.push_str("  (following)");
    }
    lines.push(field("organizer", value));
  }

  lines.push(field("type", event.event_type.to_string()));

  if let Some(status) = event.status {
    lines.push(field("status", status.to_string()));
  }

  match (event.start_at, event.end_at) {
    (Some(start), Some(end)) => {
      lines.push(field(
        "when",
        format!(
          "{} → {}",
          start.format("%Y-%m-%d %H:%M"),
          end.format("%Y-%m-%d %H:%M")
        ),
      ));
    }
    (Some(start), None) => {
      lines.push(field("starts", start.format("%Y-%m-%d %H:%M").to_string()));
    }
    (None, Some(end)) => {
      lines.push(field("ends", end.format("%Y-%m-%d %H:%M").to_string()));
    }
    (None, None) => {}
  }

  let place: Vec<&str> = [event.region.as_deref(), event.country.as_deref()]
    .into_iter()
    .flatten()
    .collect();
  if !place.is_empty() {
    lines.push(field("where", place.join(", ")));
  }

  if let Some(format) = event.format {
    lines.push(field("format", format.to_string()));
  }
  if let Some(level) = event.skill_level {
    lines.push(field("level", level.to_string()));
  }
  if let Some(prize) = event.prize_pool {
    let currency = event.prize_currency.as_deref().unwrap_or("");
    lines.push(field("prizes", format!("{prize} {currency}").trim().to_string()));
  }
  if let Some(url) = &event.url {
    lines.push(field("url", url.clone()));
  }

  if let Some(description) = &event.description {
    lines.push(Line::from(""));
    for text_line in description.lines() {
      lines.push(Line::from(text_line.to_string()));
    }
  }
}

fn push_reasons(lines: &mut Vec<Line>, scored: &ScoredEvent) {
  lines.push(Line::from(""));
  lines.push(Line::from(vec![Span::styled(
    format!("score {}", scored.score),
    Style::default()
      .fg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
  )]));

  if scored.reasons.is_empty() {
    lines.push(Line::from(vec![Span::styled(
      "No personalization rules matched.",
      Style::default().fg(Color::DarkGray),
    )]));
    return;
  }

  for reason in &scored.reasons {
    lines.push(Line::from(vec![
      Span::styled("• ", Style::default().fg(Color::Yellow)),
      Span::raw(reason.clone()),
    ]));
  }
}
