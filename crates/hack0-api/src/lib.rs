//! JSON REST API for the hack0 events directory.
//!
//! Exposes an axum [`Router`] backed by any
//! [`hack0_core::store::DirectoryStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; the viewer identity is
//! trusted from the `X-Viewer-Id` header.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", hack0_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod events;
pub mod feed;
pub mod follows;
pub mod import;
pub mod organizations;
pub mod preferences;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use hack0_core::store::DirectoryStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DirectoryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Feed
    .route("/feed", get(feed::handler::<S>))
    // Events
    .route("/events", get(events::list::<S>).post(events::create::<S>))
    .route("/events.ics", get(events::export::<S>))
    .route("/events/{id}", get(events::get_one::<S>))
    .route("/events/{id}/status", post(events::set_status::<S>))
    // Organizations
    .route(
      "/organizations",
      get(organizations::list::<S>).post(organizations::create::<S>),
    )
    .route("/organizations/{id}", get(organizations::get_one::<S>))
    .route("/organizations/{id}/verify", post(organizations::verify::<S>))
    // Follows
    .route("/viewers/{viewer_id}/follows", get(follows::list::<S>))
    .route(
      "/viewers/{viewer_id}/follows/{org_id}",
      put(follows::create::<S>).delete(follows::remove::<S>),
    )
    // Preferences
    .route(
      "/viewers/{viewer_id}/preferences",
      get(preferences::get_prefs::<S>).put(preferences::set_prefs::<S>),
    )
    // Calendar import
    .route("/import/ical", post(import::handler::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use hack0_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_app() -> Router<()> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    api_router(Arc::new(store))
  }

  async fn send(
    app: &Router<()>,
    method: &str,
    uri: &str,
    viewer: Option<Uuid>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(viewer) = viewer {
      builder = builder.header("x-viewer-id", viewer.to_string());
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
  }

  async fn json_of(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create_org(app: &Router<()>, name: &str) -> Uuid {
    let resp = send(
      app,
      "POST",
      "/organizations",
      None,
      Some(json!({ "name": name, "country": "Peru" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_of(resp).await;
    body["org_id"].as_str().unwrap().parse().unwrap()
  }

  async fn create_event(app: &Router<()>, body: Value) -> Value {
    let resp = send(app, "POST", "/events", None, Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_of(resp).await
  }

  // ── Feed ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn feed_without_viewer_header_is_empty() {
    let app = make_app().await;
    let resp = send(&app, "GET", "/feed", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = json_of(resp).await;
    assert_eq!(body["events"], json!([]));
    assert_eq!(body["next_cursor"], Value::Null);
    assert_eq!(body["has_more"], json!(false));
  }

  #[tokio::test]
  async fn feed_with_malformed_viewer_header_is_400() {
    let app = make_app().await;
    let req = Request::builder()
      .method("GET")
      .uri("/feed")
      .header("x-viewer-id", "not-a-uuid")
      .body(Body::empty())
      .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn feed_ranks_followed_organizer_first() {
    let app = make_app().await;
    let viewer = Uuid::new_v4();

    let followed = create_org(&app, "Hack Lima").await;
    let other = create_org(&app, "Otra").await;

    let resp = send(
      &app,
      "PUT",
      &format!("/viewers/{viewer}/follows/{followed}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    create_event(
      &app,
      json!({ "title": "mine", "event_type": "hackathon", "org_id": followed }),
    )
    .await;
    // Created later, so recency alone would put it first.
    create_event(
      &app,
      json!({ "title": "theirs", "event_type": "hackathon", "org_id": other }),
    )
    .await;

    let resp = send(&app, "GET", "/feed", Some(viewer), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["event"]["title"], json!("mine"));
    assert!(
      events[0]["reasons"]
        .as_array()
        .unwrap()
        .contains(&json!("from a followed community"))
    );
  }

  #[tokio::test]
  async fn feed_unknown_filter_is_treated_as_all() {
    let app = make_app().await;
    create_event(&app, json!({ "title": "e", "event_type": "meetup" })).await;

    let resp = send(
      &app,
      "GET",
      "/feed?filter=garbage",
      Some(Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn feed_competitions_filter_is_closed() {
    let app = make_app().await;
    create_event(&app, json!({ "title": "h", "event_type": "hackathon" })).await;
    create_event(&app, json!({ "title": "w", "event_type": "workshop" })).await;

    let resp = send(
      &app,
      "GET",
      "/feed?filter=competitions",
      Some(Uuid::new_v4()),
      None,
    )
    .await;
    let body = json_of(resp).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event"]["event_type"], json!("hackathon"));
  }

  // ── Events ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn event_create_get_and_404() {
    let app = make_app().await;
    let created = create_event(
      &app,
      json!({ "title": "Lima Hack Night", "event_type": "hackathon" }),
    )
    .await;
    let id = created["event_id"].as_str().unwrap();

    let resp = send(&app, "GET", &format!("/events/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["title"], json!("Lima Hack Night"));

    let resp =
      send(&app, "GET", &format!("/events/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn event_status_transition() {
    let app = make_app().await;
    let created =
      create_event(&app, json!({ "title": "e", "event_type": "meetup" })).await;
    let id = created["event_id"].as_str().unwrap();

    let resp = send(
      &app,
      "POST",
      &format!("/events/{id}/status"),
      None,
      Some(json!({ "status": "open" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["status"], json!("open"));

    let resp = send(
      &app,
      "POST",
      &format!("/events/{}/status", Uuid::new_v4()),
      None,
      Some(json!({ "status": "open" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn calendar_export_is_text_calendar() {
    let app = make_app().await;
    create_event(&app, json!({ "title": "e", "event_type": "meetup" })).await;

    let resp = send(&app, "GET", "/events.ics", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp
      .headers()
      .get(header::CONTENT_TYPE)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(ct.contains("text/calendar"), "Content-Type: {ct}");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let ics = std::str::from_utf8(&bytes).unwrap();
    assert!(ics.contains("BEGIN:VCALENDAR"));
    assert!(ics.contains("BEGIN:VEVENT"));
  }

  // ── Organizations ────────────────────────────────────────────────────────

  #[tokio::test]
  async fn organization_verify_flow() {
    let app = make_app().await;
    let org_id = create_org(&app, "Hack Lima").await;

    let resp = send(
      &app,
      "POST",
      &format!("/organizations/{org_id}/verify"),
      None,
      Some(json!({ "verified": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["is_verified"], json!(true));

    let resp = send(
      &app,
      "POST",
      &format!("/organizations/{}/verify", Uuid::new_v4()),
      None,
      Some(json!({ "verified": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Follows ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn follow_list_unfollow_round_trip() {
    let app = make_app().await;
    let viewer = Uuid::new_v4();
    let org_id = create_org(&app, "Hack Lima").await;

    let resp = send(
      &app,
      "PUT",
      &format!("/viewers/{viewer}/follows/{org_id}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp =
      send(&app, "GET", &format!("/viewers/{viewer}/follows"), None, None)
        .await;
    let body = json_of(resp).await;
    assert_eq!(body, json!([org_id.to_string()]));

    let resp = send(
      &app,
      "DELETE",
      &format!("/viewers/{viewer}/follows/{org_id}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp =
      send(&app, "GET", &format!("/viewers/{viewer}/follows"), None, None)
        .await;
    assert_eq!(json_of(resp).await, json!([]));
  }

  #[tokio::test]
  async fn follow_unknown_organization_is_404() {
    let app = make_app().await;
    let resp = send(
      &app,
      "PUT",
      &format!("/viewers/{}/follows/{}", Uuid::new_v4(), Uuid::new_v4()),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Preferences ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn preferences_put_then_get() {
    let app = make_app().await;
    let viewer = Uuid::new_v4();

    let resp = send(
      &app,
      "GET",
      &format!("/viewers/{viewer}/preferences"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(
      &app,
      "PUT",
      &format!("/viewers/{viewer}/preferences"),
      None,
      Some(json!({
        "region": "Lima",
        "format": "in-person",
        "skill_level": "beginner"
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
      &app,
      "GET",
      &format!("/viewers/{viewer}/preferences"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["region"], json!("Lima"));
    assert_eq!(body["format"], json!("in-person"));
    assert_eq!(body["skill_level"], json!("beginner"));
  }

  // ── Import ───────────────────────────────────────────────────────────────

  fn sample_ics() -> String {
    concat!(
      "BEGIN:VCALENDAR\r\nVERSION:2.0\r\n",
      "BEGIN:VEVENT\r\nUID:evt-1\r\nSUMMARY:Lima Hack \
       Night\r\nCATEGORIES:HACKATHON\r\nDTSTART:20990610T180000Z\r\nEND:VEVENT\r\n",
      "BEGIN:VEVENT\r\nUID:evt-2\r\nSUMMARY:Rust \
       Workshop\r\nCATEGORIES:WORKSHOP\r\nEND:VEVENT\r\n",
      "END:VCALENDAR\r\n",
    )
    .to_string()
  }

  async fn post_ics(
    app: &Router<()>,
    org_id: Uuid,
    ics: &str,
  ) -> axum::response::Response {
    let req = Request::builder()
      .method("POST")
      .uri(format!("/import/ical?organization_id={org_id}&source=test"))
      .header(header::CONTENT_TYPE, "text/calendar")
      .body(Body::from(ics.to_string()))
      .unwrap();
    app.clone().oneshot(req).await.unwrap()
  }

  #[tokio::test]
  async fn import_creates_then_reimport_is_unchanged() {
    let app = make_app().await;
    let org_id = create_org(&app, "Hack Lima").await;

    let resp = post_ics(&app, org_id, &sample_ics()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_of(resp).await;
    assert_eq!(body["created"], json!(2));
    assert_eq!(body["unchanged"], json!(0));

    let resp = post_ics(&app, org_id, &sample_ics()).await;
    let body = json_of(resp).await;
    assert_eq!(body["created"], json!(0));
    assert_eq!(body["unchanged"], json!(2));

    // The imported events are in the directory under the organization.
    let resp = send(&app, "GET", "/events?include_ended=true", None, None).await;
    let events = json_of(resp).await;
    let events = events.as_array().unwrap().clone();
    assert_eq!(events.len(), 2);
    assert!(
      events
        .iter()
        .all(|e| e["organizer"]["org_id"] == json!(org_id.to_string()))
    );
  }

  #[tokio::test]
  async fn import_derives_status_from_dates() {
    let app = make_app().await;
    let org_id = create_org(&app, "Hack Lima").await;

    post_ics(&app, org_id, &sample_ics()).await;

    let resp = send(&app, "GET", "/events?include_ended=true", None, None).await;
    let events = json_of(resp).await;
    let far_future = events
      .as_array()
      .unwrap()
      .iter()
      .find(|e| e["title"] == json!("Lima Hack Night"))
      .unwrap()
      .clone();
    assert_eq!(far_future["status"], json!("upcoming"));
  }

  #[tokio::test]
  async fn import_for_unknown_organization_is_404() {
    let app = make_app().await;
    let resp = post_ics(&app, Uuid::new_v4(), &sample_ics()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn import_without_envelope_is_400() {
    let app = make_app().await;
    let org_id = create_org(&app, "Hack Lima").await;
    let resp = post_ics(&app, org_id, "SUMMARY:nope\r\n").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }
}
