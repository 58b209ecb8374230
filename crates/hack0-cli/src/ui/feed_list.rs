//! Feed list pane — left panel, ranked events with their scores.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

/// Render the ranked feed into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let visible = app.visible_events();
  let total = app.events.len();

  // Title with count; `+` marks a further page on the server.
  let more = if app.has_more { "+" } else { "" };
  let title = if app.search_active || !app.search.is_empty() {
    format!(" Feed ({}/{}{more}) ", visible.len(), total)
  } else {
    format!(" Feed ({total}{more}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  // Build list items.
  let items: Vec<ListItem> = visible
    .iter()
    .enumerate()
    .map(|(i, scored)| {
      let is_cursor = i == app.list_cursor;

      let row_style = if is_cursor {
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };

      let score_style = if is_cursor {
        row_style
      } else {
        Style::default().fg(Color::Cyan)
      };

      let followed_mark = scored
        .event
        .organizer
        .as_ref()
        .is_some_and(|o| app.followed.contains(&o.org_id));

      ListItem::new(Line::from(vec![
        Span::styled(format!("{:>4} ", scored.score), score_style),
        Span::styled(if followed_mark { "★ " } else { "  " }, row_style),
        Span::styled(scored.event.title.clone(), row_style),
        Span::styled(
          format!("  {}", scored.event.event_type),
          if is_cursor {
            row_style
          } else {
            Style::default().fg(Color::DarkGray)
          },
        ),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // If search is active or set, show a query bar at the bottom of the
  // inner area.
  if app.search_active || !app.search.is_empty() && inner_area.height > 2 {
    let search_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let search_text = if app.search_active {
      format!("/{}_", app.search)
    } else {
      format!("/{}", app.search)
    };
    f.render_widget(
      ratatui::widgets::Paragraph::new(search_text)
        .style(Style::default().fg(Color::Yellow)),
      search_area,
    );
  }

  // Scrollable list with cursor tracking.
  let mut state = ListState::default();
  state.select(if visible.is_empty() {
    None
  } else {
    Some(app.list_cursor)
  });

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    inner_area,
    &mut state,
  );
}
