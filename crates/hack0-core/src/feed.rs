//! The personalized feed ranker.
//!
//! A pure, single-pass scoring function over candidate events plus a thin
//! cursor-pagination wrapper. The ranker never writes to any store; each
//! call operates on its own locally-fetched snapshot, so any number of
//! ranking calls may run in parallel without coordination.
//!
//! All relative-time rules (starting-soon, recently-published, the
//! ended-event cutoff) share one `now` captured at the start of the call,
//! so a page is internally consistent and tests can inject a fixed clock.

use std::{collections::HashSet, convert::Infallible, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  event::{Event, EventCategory, EventFormat, EventStatus},
  preferences::Preferences,
  store::{DirectoryStore, EventQuery},
};

// ─── Tuning constants ────────────────────────────────────────────────────────

/// Page size when the caller does not specify one.
pub const DEFAULT_LIMIT: usize = 20;

/// Candidate rows fetched per requested row, so re-ranking can promote
/// lower-recency-but-higher-relevance events within the fetched window.
pub const OVERFETCH_FACTOR: usize = 3;

const SCORE_FOLLOWED: u32 = 100;
const SCORE_REGION: u32 = 50;
const SCORE_FORMAT_EXACT: u32 = 30;
const SCORE_FORMAT_HYBRID: u32 = 15;
const SCORE_SKILL: u32 = 20;
const SCORE_ONGOING: u32 = 40;
const SCORE_OPEN: u32 = 30;
const SCORE_STARTING_SOON: u32 = 25;
const SCORE_VERIFIED: u32 = 15;
const SCORE_PRIZE: u32 = 10;
const SCORE_FRESH: u32 = 10;

/// "Starting soon" window, in whole days.
const STARTING_SOON_DAYS: i64 = 7;

/// "Recently published" window.
const FRESH_WINDOW_HOURS: i64 = 24;

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Post-scoring subset selection over category buckets (plus the
/// follow-graph variant).
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FeedFilter {
  #[default]
  All,
  Following,
  Competitions,
  Learning,
  Community,
}

impl FeedFilter {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::All => "all",
      Self::Following => "following",
      Self::Competitions => "competitions",
      Self::Learning => "learning",
      Self::Community => "community",
    }
  }

  /// Whether `event` belongs to this filter's subset.
  pub fn admits(self, event: &Event, followed: &HashSet<Uuid>) -> bool {
    match self {
      Self::All => true,
      Self::Following => event
        .organizer
        .as_ref()
        .is_some_and(|o| followed.contains(&o.org_id)),
      Self::Competitions => {
        event.event_type.category() == EventCategory::Competitions
      }
      Self::Learning => event.event_type.category() == EventCategory::Learning,
      Self::Community => {
        event.event_type.category() == EventCategory::Community
      }
    }
  }
}

/// Never fails: anything unrecognized is treated as [`FeedFilter::All`].
impl FromStr for FeedFilter {
  type Err = Infallible;

  fn from_str(s: &str) -> Result<Self, Infallible> {
    Ok(match s {
      "following" => Self::Following,
      "competitions" => Self::Competitions,
      "learning" => Self::Learning,
      "community" => Self::Community,
      _ => Self::All,
    })
  }
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// Parameters for one feed page.
#[derive(Debug, Clone)]
pub struct FeedOptions {
  /// Output page size. Normalized to at least 1.
  pub limit:         usize,
  /// Keyset cursor: only events created strictly before this instant.
  pub cursor:        Option<DateTime<Utc>>,
  /// When false, only events whose `end_at` is in the future (or null)
  /// are eligible.
  pub include_ended: bool,
  pub filter:        FeedFilter,
}

impl Default for FeedOptions {
  fn default() -> Self {
    Self {
      limit:         DEFAULT_LIMIT,
      cursor:        None,
      include_ended: false,
      filter:        FeedFilter::All,
    }
  }
}

impl FeedOptions {
  fn fetch_limit(&self) -> usize { self.limit.max(1) * OVERFETCH_FACTOR }
}

// ─── Ranking inputs and outputs ──────────────────────────────────────────────

/// The viewer-side inputs every scoring rule reads.
#[derive(Debug, Clone, Default)]
pub struct RankingContext {
  /// Organizations the viewer follows.
  pub followed:    HashSet<Uuid>,
  /// `None` means "no preference"; preference-based rules contribute zero.
  pub preferences: Option<Preferences>,
}

/// A candidate event annotated with its relevance score and the
/// human-readable reasons each fired rule emitted. Created fresh on every
/// ranking call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEvent {
  pub event:   Event,
  pub score:   u32,
  pub reasons: Vec<String>,
}

/// One page of the personalized feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
  pub events:      Vec<ScoredEvent>,
  pub next_cursor: Option<DateTime<Utc>>,
  pub has_more:    bool,
}

impl FeedPage {
  pub fn empty() -> Self {
    Self {
      events:      Vec::new(),
      next_cursor: None,
      has_more:    false,
    }
  }
}

// ─── Scoring ─────────────────────────────────────────────────────────────────

/// Score one candidate event for the viewer described by `ctx`.
///
/// All rules are additive and independent; a rule whose field is absent
/// contributes nothing. Pure — same inputs, same score and reason list.
pub fn score_event(
  event: Event,
  ctx: &RankingContext,
  now: DateTime<Utc>,
) -> ScoredEvent {
  let mut score = 0u32;
  let mut reasons = Vec::new();

  if let Some(org) = &event.organizer
    && ctx.followed.contains(&org.org_id)
  {
    score += SCORE_FOLLOWED;
    reasons.push("from a followed community".to_string());
  }

  if let Some(prefs) = &ctx.preferences {
    if let (Some(wanted), Some(region)) =
      (prefs.region.as_deref(), event.region.as_deref())
      && region == wanted
    {
      score += SCORE_REGION;
      reasons.push(format!("in {region}"));
    }

    // The two format rules are independent checks, not an if/else. Their
    // mutual exclusivity is emergent: a hybrid event scores the exact
    // bonus only when the preference is literally hybrid, and the
    // fallback only when it is not.
    if let Some(format) = event.format
      && !prefs.format.is_any()
    {
      if prefs.format.matches(format) {
        score += SCORE_FORMAT_EXACT;
        reasons.push(format!("format {format}"));
      }
      if format == EventFormat::Hybrid && !prefs.format.matches(format) {
        score += SCORE_FORMAT_HYBRID;
        reasons.push("hybrid format".to_string());
      }
    }

    if let Some(level) = event.skill_level
      && !prefs.skill_level.is_all()
      && prefs.skill_level.admits(level)
    {
      score += SCORE_SKILL;
      reasons.push(format!("level {}", prefs.skill_level));
    }
  }

  match event.status {
    Some(EventStatus::Ongoing) => {
      score += SCORE_ONGOING;
      reasons.push("event in progress".to_string());
    }
    Some(EventStatus::Open) => {
      score += SCORE_OPEN;
      reasons.push("registration open".to_string());
    }
    _ => {}
  }

  if let Some(start) = event.start_at {
    let until = start - now;
    if until >= Duration::zero() && until.num_days() <= STARTING_SOON_DAYS {
      score += SCORE_STARTING_SOON;
      reasons.push("starting soon".to_string());
    }
  }

  if let Some(org) = &event.organizer
    && org.is_verified
  {
    score += SCORE_VERIFIED;
    reasons.push("verified organizer".to_string());
  }

  if let Some(prize) = event.prize_pool
    && prize > 0
  {
    score += SCORE_PRIZE;
    reasons.push(format!("{prize} in prizes"));
  }

  if now - event.created_at <= Duration::hours(FRESH_WINDOW_HOURS) {
    score += SCORE_FRESH;
    reasons.push("recently published".to_string());
  }

  ScoredEvent {
    event,
    score,
    reasons,
  }
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

/// Score, filter, sort, and paginate one raw candidate batch.
///
/// `candidates` must be the full over-fetched batch, ordered by
/// `created_at` descending — `has_more` is inferred from its length, and
/// the stable sort relies on that pre-ordering for its most-recent-first
/// tie-break.
pub fn rank_candidates(
  candidates: Vec<Event>,
  ctx: &RankingContext,
  options: &FeedOptions,
  now: DateTime<Utc>,
) -> FeedPage {
  let raw_count = candidates.len();

  let mut scored: Vec<ScoredEvent> = candidates
    .into_iter()
    .map(|event| score_event(event, ctx, now))
    .collect();

  scored.retain(|s| options.filter.admits(&s.event, &ctx.followed));

  // Stable sort over created_at-descending input: equal scores keep
  // most-recent-first order.
  scored.sort_by(|a, b| b.score.cmp(&a.score));
  scored.truncate(options.limit.max(1));

  // Heuristic: the over-fetch came back full, so assume more rows exist.
  let has_more = raw_count >= options.fetch_limit();
  let next_cursor = if has_more {
    scored.last().map(|s| s.event.created_at)
  } else {
    None
  };

  FeedPage {
    events: scored,
    next_cursor,
    has_more,
  }
}

/// Produce one page of the personalized feed for `viewer` against an
/// injected clock. Fully deterministic given the store contents.
///
/// No viewer identity is not an error: unauthenticated viewers get an
/// empty page without the store being consulted.
pub async fn rank_feed_at<S>(
  store: &S,
  viewer: Option<Uuid>,
  options: &FeedOptions,
  now: DateTime<Utc>,
) -> Result<FeedPage, S::Error>
where
  S: DirectoryStore,
{
  let Some(viewer_id) = viewer else {
    return Ok(FeedPage::empty());
  };

  let ctx = RankingContext {
    followed:    store.followed_organizations(viewer_id).await?,
    preferences: store.get_preferences(viewer_id).await?,
  };

  let query = EventQuery {
    created_before: options.cursor,
    min_end_at:     (!options.include_ended).then_some(now),
    limit:          options.fetch_limit(),
  };
  let candidates = store.fetch_events(&query).await?;

  Ok(rank_candidates(candidates, &ctx, options, now))
}

/// [`rank_feed_at`] with the clock captured once at the start of the call.
pub async fn rank_feed<S>(
  store: &S,
  viewer: Option<Uuid>,
  options: &FeedOptions,
) -> Result<FeedPage, S::Error>
where
  S: DirectoryStore,
{
  rank_feed_at(store, viewer, options, Utc::now()).await
}

// ─── Tests ───────────────────────────────────────────────────────────────────
