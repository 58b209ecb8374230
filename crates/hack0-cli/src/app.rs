//! Application state machine and event dispatcher.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use hack0_core::feed::{FeedFilter, ScoredEvent};
use uuid::Uuid;

use crate::client::ApiClient;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the ranked feed list; right pane previews the selection.
  FeedList,
  /// Focus on the event detail pane.
  EventDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The active feed filter; `Tab` cycles it.
  pub filter: FeedFilter,

  /// Accumulated scored events (`n` appends the next page).
  pub events: Vec<ScoredEvent>,

  /// Cursor for the next page, when the server reported more.
  pub next_cursor: Option<DateTime<Utc>>,
  pub has_more:    bool,

  /// The viewer's follow set, kept in sync with `f` toggles.
  pub followed: HashSet<Uuid>,

  /// Current fuzzy-search string (only active when `search_active`).
  pub search: String,

  /// Whether the user is typing a search query.
  pub search_active: bool,

  /// Cursor position within the *visible* (searched) event list.
  pub list_cursor: usize,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// The event shown in the detail pane.
  pub selected_event_id: Option<Uuid>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  /// Create an [`App`] with an empty feed.
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::FeedList,
      filter: FeedFilter::All,
      events: Vec::new(),
      next_cursor: None,
      has_more: false,
      followed: HashSet::new(),
      search: String::new(),
      search_active: false,
      list_cursor: 0,
      detail_scroll: 0,
      selected_event_id: None,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the follow set and the first feed page for the active filter.
  pub async fn load_feed(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading feed…".into();

    match self.client.followed_organizations().await {
      Ok(followed) => self.followed = followed,
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        return Err(e);
      }
    }

    match self.client.get_feed(self.filter, None).await {
      Ok(page) => {
        self.events = page.events;
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.list_cursor = 0;
        self.status_msg = if self.client.viewer().is_none() {
          "No --viewer configured; the feed is empty.".into()
        } else {
          String::new()
        };
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Append the next page, if the server reported one.
  async fn load_more(&mut self) {
    if !self.has_more {
      self.status_msg = "No more events.".into();
      return;
    }
    let cursor = self.next_cursor;
    match self.client.get_feed(self.filter, cursor).await {
      Ok(page) => {
        self.events.extend(page.events);
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        self.status_msg = String::new();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  // ── Visible list ──────────────────────────────────────────────────────────

  /// Events matching the current search query, in ranked order.
  pub fn visible_events(&self) -> Vec<&ScoredEvent> {
    if self.search.is_empty() {
      return self.events.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .events
      .iter()
      .filter(|s| {
        matcher.fuzzy_match(&s.event.title, &self.search).is_some()
          || s.event.organizer.as_ref().is_some_and(|o| {
            matcher.fuzzy_match(&o.name, &self.search).is_some()
          })
      })
      .collect()
  }

  /// The event under the list cursor in the visible view, if any.
  pub fn cursor_event(&self) -> Option<&ScoredEvent> {
    let list = self.visible_events();
    list.get(self.list_cursor).copied()
  }

  /// The event shown in the detail pane, if any.
  pub fn selected_event(&self) -> Option<&ScoredEvent> {
    let id = self.selected_event_id?;
    self.events.iter().find(|s| s.event.event_id == id)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    // Search input mode: all printable keys go into the query string.
    if self.search_active {
      return self.handle_search_key(key);
    }

    match self.screen {
      Screen::FeedList => self.handle_list_key(key).await,
      Screen::EventDetail => self.handle_detail_key(key).await,
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.list_cursor = 0;
        // Immediately open detail if there's exactly one match.
        let only = {
          let list = self.visible_events();
          if list.len() == 1 {
            Some(list[0].event.event_id)
          } else {
            None
          }
        };
        if let Some(id) = only {
          self.open_detail(id);
        }
      }
      KeyCode::Backspace => {
        self.search.pop();
        self.list_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.search.push(c);
        self.list_cursor = 0;
      }
      _ => {}
    }
    Ok(true)
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.visible_events().len();
        if len > 0 && self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.list_cursor > 0 {
          self.list_cursor -= 1;
        }
      }

      // Open detail
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_event().map(|s| s.event.event_id) {
          self.open_detail(id);
        }
      }

      // Search
      KeyCode::Char('/') => {
        self.search_active = true;
        self.search.clear();
        self.list_cursor = 0;
      }

      // Cycle the feed filter
      KeyCode::Tab => {
        self.filter = next_filter(self.filter);
        self.load_feed().await.ok();
      }

      // Follow / unfollow the organizer under the cursor
      KeyCode::Char('f') => {
        let org = self
          .cursor_event()
          .and_then(|s| s.event.organizer.as_ref())
          .map(|o| (o.org_id, o.name.clone()));
        self.toggle_follow(org).await;
      }

      // More / reload
      KeyCode::Char('n') => self.load_more().await,
      KeyCode::Char('r') => {
        self.load_feed().await.ok();
      }

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      // Quit
      KeyCode::Char('q') => return Ok(false),

      // Back to list
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::FeedList;
        self.selected_event_id = None;
        self.detail_scroll = 0;
      }

      // Scroll detail
      KeyCode::Down | KeyCode::Char('j') => {
        self.detail_scroll += 1;
      }
      KeyCode::Up | KeyCode::Char('k') => {
        if self.detail_scroll > 0 {
          self.detail_scroll -= 1;
        }
      }

      // Navigate the list from detail (for quick switching)
      KeyCode::Char(']') | KeyCode::PageDown => {
        let next = {
          let list = self.visible_events();
          if self.list_cursor + 1 < list.len() {
            Some((self.list_cursor + 1, list[self.list_cursor + 1].event.event_id))
          } else {
            None
          }
        };
        if let Some((i, id)) = next {
          self.list_cursor = i;
          self.open_detail(id);
        }
      }
      KeyCode::Char('[') | KeyCode::PageUp => {
        let prev = {
          let list = self.visible_events();
          if self.list_cursor > 0 && !list.is_empty() {
            Some((self.list_cursor - 1, list[self.list_cursor - 1].event.event_id))
          } else {
            None
          }
        };
        if let Some((i, id)) = prev {
          self.list_cursor = i;
          self.open_detail(id);
        }
      }

      // Follow / unfollow the organizer of the shown event
      KeyCode::Char('f') => {
        let org = self
          .selected_event()
          .and_then(|s| s.event.organizer.as_ref())
          .map(|o| (o.org_id, o.name.clone()));
        self.toggle_follow(org).await;
      }

      _ => {}
    }
    Ok(true)
  }

  /// Transition to `EventDetail` for `event_id`.
  fn open_detail(&mut self, event_id: Uuid) {
    self.selected_event_id = Some(event_id);
    self.detail_scroll = 0;
    self.screen = Screen::EventDetail;
  }

  /// Follow or unfollow `org`, then reload so scores reflect the change.
  async fn toggle_follow(&mut self, org: Option<(Uuid, String)>) {
    let Some((org_id, name)) = org else {
      self.status_msg = "This event has no organizer to follow.".into();
      return;
    };

    let result = if self.followed.contains(&org_id) {
      self.client.unfollow(org_id).await.map(|()| {
        self.followed.remove(&org_id);
        format!("Unfollowed {name}.")
      })
    } else {
      self.client.follow(org_id).await.map(|()| {
        self.followed.insert(org_id);
        format!("Following {name}.")
      })
    };

    match result {
      Ok(msg) => {
        self.status_msg = msg;
        // Keep the selection; only the scores move.
        let keep = self.selected_event_id;
        self.load_feed().await.ok();
        self.selected_event_id = keep;
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }
}

// ─── Filter cycling ───────────────────────────────────────────────────────────

fn next_filter(filter: FeedFilter) -> FeedFilter {
  match filter {
    FeedFilter::All => FeedFilter::Following,
    FeedFilter::Following => FeedFilter::Competitions,
    FeedFilter::Competitions => FeedFilter::Learning,
    FeedFilter::Learning => FeedFilter::Community,
    FeedFilter::Community => FeedFilter::All,
  }
}
