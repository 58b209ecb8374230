//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use hack0_core::{
  event::{EventStatus, EventType, NewEvent},
  feed::{FeedFilter, FeedOptions, rank_feed_at},
  org::NewOrganization,
  preferences::{FormatPreference, Preferences, SkillPreference},
  store::{DirectoryStore, EventQuery, ImportOutcome},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_org(name: &str) -> NewOrganization {
  NewOrganization {
    name:    name.into(),
    country: Some("Peru".into()),
  }
}

fn hackathon(title: &str, org_id: Option<Uuid>) -> NewEvent {
  let mut input = NewEvent::new(title, EventType::Hackathon);
  input.org_id = org_id;
  input
}

// ─── Organizations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_organization() {
  let s = store().await;

  let org = s.add_organization(new_org("Hack Lima")).await.unwrap();
  assert!(!org.is_verified);

  let fetched = s.get_organization(org.org_id).await.unwrap().unwrap();
  assert_eq!(fetched.org_id, org.org_id);
  assert_eq!(fetched.name, "Hack Lima");
  assert_eq!(fetched.country.as_deref(), Some("Peru"));
}

#[tokio::test]
async fn get_organization_missing_returns_none() {
  let s = store().await;
  assert!(s.get_organization(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn list_organizations_all() {
  let s = store().await;
  s.add_organization(new_org("A")).await.unwrap();
  s.add_organization(new_org("B")).await.unwrap();

  let all = s.list_organizations().await.unwrap();
  assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn verify_flag_round_trip() {
  let s = store().await;
  let org = s.add_organization(new_org("Hack Lima")).await.unwrap();

  let verified = s.set_verified(org.org_id, true).await.unwrap();
  assert!(verified.is_verified);

  let unverified = s.set_verified(org.org_id, false).await.unwrap();
  assert!(!unverified.is_verified);
}

#[tokio::test]
async fn verify_unknown_organization_errors() {
  let s = store().await;
  let err = s.set_verified(Uuid::new_v4(), true).await.unwrap_err();
  assert!(matches!(err, crate::Error::OrganizationNotFound(_)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_event_embeds_organizer() {
  let s = store().await;
  let org = s.add_organization(new_org("Hack Lima")).await.unwrap();
  s.set_verified(org.org_id, true).await.unwrap();

  let event = s
    .add_event(hackathon("Lima Hack Night", Some(org.org_id)))
    .await
    .unwrap();

  let organizer = event.organizer.unwrap();
  assert_eq!(organizer.org_id, org.org_id);
  assert_eq!(organizer.name, "Hack Lima");
  assert!(organizer.is_verified);
}

#[tokio::test]
async fn add_event_unknown_organization_errors() {
  let s = store().await;
  let err = s
    .add_event(hackathon("Orphan", Some(Uuid::new_v4())))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::OrganizationNotFound(_)));
}

#[tokio::test]
async fn add_event_without_organizer() {
  let s = store().await;
  let event = s.add_event(hackathon("Indie", None)).await.unwrap();
  assert!(event.organizer.is_none());

  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();
  assert!(fetched.organizer.is_none());
  assert_eq!(fetched.title, "Indie");
}

#[tokio::test]
async fn event_fields_round_trip() {
  let s = store().await;

  let mut input = NewEvent::new("Full", EventType::Workshop);
  input.description = Some("desc".into());
  input.url = Some("https://example.com".into());
  input.status = Some(EventStatus::Open);
  input.start_at = Some(Utc::now() + Duration::days(2));
  input.end_at = Some(Utc::now() + Duration::days(3));
  input.country = Some("Peru".into());
  input.region = Some("Lima".into());
  input.format = Some(hack0_core::event::EventFormat::InPerson);
  input.skill_level = Some(hack0_core::event::SkillLevel::Beginner);
  input.prize_pool = Some(5000);
  input.prize_currency = Some("PEN".into());

  let event = s.add_event(input).await.unwrap();
  let fetched = s.get_event(event.event_id).await.unwrap().unwrap();

  assert_eq!(fetched.status, Some(EventStatus::Open));
  assert_eq!(fetched.region.as_deref(), Some("Lima"));
  assert_eq!(
    fetched.format,
    Some(hack0_core::event::EventFormat::InPerson)
  );
  assert_eq!(
    fetched.skill_level,
    Some(hack0_core::event::SkillLevel::Beginner)
  );
  assert_eq!(fetched.prize_pool, Some(5000));
  assert_eq!(fetched.prize_currency.as_deref(), Some("PEN"));
}

#[tokio::test]
async fn fetch_events_newest_first() {
  let s = store().await;
  s.add_event(hackathon("first", None)).await.unwrap();
  s.add_event(hackathon("second", None)).await.unwrap();
  s.add_event(hackathon("third", None)).await.unwrap();

  let events = s
    .fetch_events(&EventQuery {
      limit: 10,
      ..Default::default()
    })
    .await
    .unwrap();

  let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles, ["third", "second", "first"]);
}

#[tokio::test]
async fn fetch_events_respects_created_before() {
  let s = store().await;
  s.add_event(hackathon("old", None)).await.unwrap();
  let middle = s.add_event(hackathon("middle", None)).await.unwrap();
  s.add_event(hackathon("new", None)).await.unwrap();

  let events = s
    .fetch_events(&EventQuery {
      created_before: Some(middle.created_at),
      limit: 10,
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(events.len(), 1);
  assert_eq!(events[0].title, "old");
  assert!(events[0].created_at < middle.created_at);
}

#[tokio::test]
async fn fetch_events_min_end_excludes_ended_keeps_open_ended() {
  let s = store().await;

  let mut ended = NewEvent::new("ended", EventType::Meetup);
  ended.end_at = Some(Utc::now() - Duration::days(1));
  s.add_event(ended).await.unwrap();

  let mut upcoming = NewEvent::new("upcoming", EventType::Meetup);
  upcoming.end_at = Some(Utc::now() + Duration::days(1));
  s.add_event(upcoming).await.unwrap();

  // No end date at all stays eligible.
  s.add_event(NewEvent::new("open-ended", EventType::Meetup))
    .await
    .unwrap();

  let events = s
    .fetch_events(&EventQuery {
      min_end_at: Some(Utc::now()),
      limit: 10,
      ..Default::default()
    })
    .await
    .unwrap();

  let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
  assert_eq!(titles.len(), 2);
  assert!(titles.contains(&"upcoming"));
  assert!(titles.contains(&"open-ended"));
}

#[tokio::test]
async fn fetch_events_limit() {
  let s = store().await;
  for i in 0..5 {
    s.add_event(hackathon(&format!("e{i}"), None)).await.unwrap();
  }

  let events = s
    .fetch_events(&EventQuery {
      limit: 3,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn set_event_status_transitions() {
  let s = store().await;
  let event = s.add_event(hackathon("Lima Hack", None)).await.unwrap();
  assert!(event.status.is_none());

  let updated = s
    .set_event_status(event.event_id, EventStatus::Open)
    .await
    .unwrap();
  assert_eq!(updated.status, Some(EventStatus::Open));

  let err = s
    .set_event_status(Uuid::new_v4(), EventStatus::Open)
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::EventNotFound(_)));
}

// ─── Import upserts ──────────────────────────────────────────────────────────

fn imported(org_id: Uuid, uid: &str, digest: &str, title: &str) -> NewEvent {
  let mut input = hackathon(title, Some(org_id));
  input.source_uid = Some(uid.into());
  input.import_digest = Some(digest.into());
  input
}

#[tokio::test]
async fn upsert_creates_then_skips_then_updates() {
  let s = store().await;
  let org = s.add_organization(new_org("Hack Lima")).await.unwrap();

  let (event, outcome) = s
    .upsert_imported_event(imported(org.org_id, "uid-1", "d1", "v1"))
    .await
    .unwrap();
  assert_eq!(outcome, ImportOutcome::Created);

  let (same, outcome) = s
    .upsert_imported_event(imported(org.org_id, "uid-1", "d1", "renamed"))
    .await
    .unwrap();
  assert_eq!(outcome, ImportOutcome::Unchanged);
  assert_eq!(same.event_id, event.event_id);
  // Unchanged digest means the rename was not applied.
  assert_eq!(same.title, "v1");

  let (updated, outcome) = s
    .upsert_imported_event(imported(org.org_id, "uid-1", "d2", "v2"))
    .await
    .unwrap();
  assert_eq!(outcome, ImportOutcome::Updated);
  assert_eq!(updated.event_id, event.event_id);
  assert_eq!(updated.title, "v2");
  assert_eq!(updated.created_at, event.created_at);
}

#[tokio::test]
async fn upsert_without_source_uid_errors() {
  let s = store().await;
  let err = s
    .upsert_imported_event(hackathon("no uid", None))
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::MissingSourceUid));
}

#[tokio::test]
async fn same_uid_under_different_orgs_is_two_events() {
  let s = store().await;
  let a = s.add_organization(new_org("A")).await.unwrap();
  let b = s.add_organization(new_org("B")).await.unwrap();

  let (ea, _) = s
    .upsert_imported_event(imported(a.org_id, "uid-1", "d1", "A's"))
    .await
    .unwrap();
  let (eb, outcome) = s
    .upsert_imported_event(imported(b.org_id, "uid-1", "d1", "B's"))
    .await
    .unwrap();

  assert_eq!(outcome, ImportOutcome::Created);
  assert_ne!(ea.event_id, eb.event_id);
}

// ─── Follows ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn follow_unfollow_round_trip() {
  let s = store().await;
  let viewer = Uuid::new_v4();
  let org = s.add_organization(new_org("Hack Lima")).await.unwrap();

  s.follow(viewer, org.org_id).await.unwrap();
  // Following twice is not an error.
  s.follow(viewer, org.org_id).await.unwrap();

  let followed = s.followed_organizations(viewer).await.unwrap();
  assert_eq!(followed.len(), 1);
  assert!(followed.contains(&org.org_id));

  s.unfollow(viewer, org.org_id).await.unwrap();
  // Unfollowing twice is not an error either.
  s.unfollow(viewer, org.org_id).await.unwrap();

  assert!(s.followed_organizations(viewer).await.unwrap().is_empty());
}

#[tokio::test]
async fn follow_unknown_organization_errors() {
  let s = store().await;
  let err = s.follow(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, crate::Error::OrganizationNotFound(_)));
}

// ─── Preferences ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn preferences_upsert_and_get() {
  let s = store().await;
  let viewer = Uuid::new_v4();

  assert!(s.get_preferences(viewer).await.unwrap().is_none());

  let prefs = Preferences {
    viewer_id:   viewer,
    region:      Some("Lima".into()),
    format:      FormatPreference::InPerson,
    skill_level: SkillPreference::Beginner,
  };
  s.set_preferences(prefs.clone()).await.unwrap();

  let stored = s.get_preferences(viewer).await.unwrap().unwrap();
  assert_eq!(stored.region.as_deref(), Some("Lima"));
  assert_eq!(stored.format, FormatPreference::InPerson);
  assert_eq!(stored.skill_level, SkillPreference::Beginner);

  // Second write replaces the record.
  let mut revised = prefs;
  revised.region = Some("Cusco".into());
  revised.format = FormatPreference::Any;
  s.set_preferences(revised).await.unwrap();

  let stored = s.get_preferences(viewer).await.unwrap().unwrap();
  assert_eq!(stored.region.as_deref(), Some("Cusco"));
  assert_eq!(stored.format, FormatPreference::Any);
}

// ─── Feed over the real store ────────────────────────────────────────────────

#[tokio::test]
async fn feed_without_viewer_is_empty() {
  let s = store().await;
  s.add_event(hackathon("ignored", None)).await.unwrap();

  let page = rank_feed_at(&s, None, &FeedOptions::default(), Utc::now())
    .await
    .unwrap();
  assert!(page.events.is_empty());
  assert!(page.next_cursor.is_none());
  assert!(!page.has_more);
}

#[tokio::test]
async fn feed_over_empty_store_is_empty() {
  let s = store().await;
  let page = rank_feed_at(
    &s,
    Some(Uuid::new_v4()),
    &FeedOptions::default(),
    Utc::now(),
  )
  .await
  .unwrap();
  assert!(page.events.is_empty());
  assert!(page.next_cursor.is_none());
  assert!(!page.has_more);
}

#[tokio::test]
async fn feed_ranks_followed_and_matching_events_first() {
  let s = store().await;
  let viewer = Uuid::new_v4();

  let followed_org = s.add_organization(new_org("Hack Lima")).await.unwrap();
  let other_org = s.add_organization(new_org("Otra")).await.unwrap();
  s.follow(viewer, followed_org.org_id).await.unwrap();

  s.set_preferences(Preferences {
    viewer_id:   viewer,
    region:      Some("Lima".into()),
    format:      FormatPreference::InPerson,
    skill_level: SkillPreference::Beginner,
  })
  .await
  .unwrap();

  let mut good = hackathon("good", Some(followed_org.org_id));
  good.region = Some("Lima".into());
  good.format = Some(hack0_core::event::EventFormat::InPerson);
  good.skill_level = Some(hack0_core::event::SkillLevel::Beginner);
  good.status = Some(EventStatus::Open);
  s.add_event(good).await.unwrap();

  let mut meh = hackathon("meh", Some(other_org.org_id));
  meh.region = Some("Cusco".into());
  meh.prize_pool = Some(5000);
  // Newer than "good", so recency alone would rank it first.
  s.add_event(meh).await.unwrap();

  let page = rank_feed_at(&s, Some(viewer), &FeedOptions::default(), Utc::now())
    .await
    .unwrap();

  assert_eq!(page.events.len(), 2);
  assert_eq!(page.events[0].event.title, "good");
  assert!(page.events[0].score > page.events[1].score);
  assert!(
    page.events[0]
      .reasons
      .contains(&"from a followed community".to_string())
  );
}

#[tokio::test]
async fn feed_following_filter_only_returns_followed() {
  let s = store().await;
  let viewer = Uuid::new_v4();

  let followed_org = s.add_organization(new_org("Hack Lima")).await.unwrap();
  let other_org = s.add_organization(new_org("Otra")).await.unwrap();
  s.follow(viewer, followed_org.org_id).await.unwrap();

  s.add_event(hackathon("mine", Some(followed_org.org_id)))
    .await
    .unwrap();
  s.add_event(hackathon("theirs", Some(other_org.org_id)))
    .await
    .unwrap();

  let options = FeedOptions {
    filter: FeedFilter::Following,
    ..FeedOptions::default()
  };
  let page = rank_feed_at(&s, Some(viewer), &options, Utc::now())
    .await
    .unwrap();

  assert_eq!(page.events.len(), 1);
  assert_eq!(page.events[0].event.title, "mine");
}

#[tokio::test]
async fn feed_cursor_never_repeats_rows() {
  let s = store().await;
  let viewer = Uuid::new_v4();
  for i in 0..9 {
    s.add_event(hackathon(&format!("e{i}"), None)).await.unwrap();
  }

  let options = FeedOptions {
    limit: 2,
    ..FeedOptions::default()
  };
  let first = rank_feed_at(&s, Some(viewer), &options, Utc::now())
    .await
    .unwrap();
  assert_eq!(first.events.len(), 2);
  assert!(first.has_more);
  let cursor = first.next_cursor.unwrap();

  let second_options = FeedOptions {
    cursor: Some(cursor),
    ..options
  };
  let second = rank_feed_at(&s, Some(viewer), &second_options, Utc::now())
    .await
    .unwrap();

  assert!(!second.events.is_empty());
  for scored in &second.events {
    assert!(scored.event.created_at < cursor);
  }
}
