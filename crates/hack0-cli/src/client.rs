//! Async HTTP client wrapping the hack0 JSON API.

use std::{collections::HashSet, time::Duration};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use hack0_core::feed::{FeedFilter, FeedPage};
use reqwest::Client;
use uuid::Uuid;

/// Connection settings for the hack0 API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// The feed is personalized for this viewer; `None` yields an empty
  /// feed by server policy.
  pub viewer:   Option<Uuid>,
}

/// Async HTTP client for the hack0 JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn viewer(&self) -> Option<Uuid> { self.config.viewer }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn with_viewer(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match self.config.viewer {
      Some(viewer) => req.header("X-Viewer-Id", viewer.to_string()),
      None => req,
    }
  }

  // ── Feed ──────────────────────────────────────────────────────────────────

  /// `GET /api/feed?filter=…[&cursor=…]`
  pub async fn get_feed(
    &self,
    filter: FeedFilter,
    cursor: Option<DateTime<Utc>>,
  ) -> Result<FeedPage> {
    let mut req = self
      .with_viewer(self.client.get(self.url("/feed")))
      .query(&[("filter", filter.as_str())]);
    if let Some(cursor) = cursor {
      req = req.query(&[("cursor", cursor.to_rfc3339())]);
    }

    let resp = req.send().await.context("GET /feed failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("GET /feed → {}", resp.status()));
    }
    resp.json().await.context("deserialising feed page")
  }

  // ── Follows ───────────────────────────────────────────────────────────────

  /// `GET /api/viewers/{viewer}/follows`
  pub async fn followed_organizations(&self) -> Result<HashSet<Uuid>> {
    let Some(viewer) = self.config.viewer else {
      return Ok(HashSet::new());
    };

    let resp = self
      .client
      .get(self.url(&format!("/viewers/{viewer}/follows")))
      .send()
      .await
      .context("GET /follows failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /follows → {}", resp.status()));
    }
    resp.json().await.context("deserialising follow set")
  }

  /// `PUT /api/viewers/{viewer}/follows/{org_id}`
  pub async fn follow(&self, org_id: Uuid) -> Result<()> {
    let viewer = self
      .config
      .viewer
      .ok_or_else(|| anyhow!("no viewer configured"))?;

    let resp = self
      .client
      .put(self.url(&format!("/viewers/{viewer}/follows/{org_id}")))
      .send()
      .await
      .context("PUT /follows failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("PUT /follows → {}", resp.status()));
    }
    Ok(())
  }

  /// `DELETE /api/viewers/{viewer}/follows/{org_id}`
  pub async fn unfollow(&self, org_id: Uuid) -> Result<()> {
    let viewer = self
      .config
      .viewer
      .ok_or_else(|| anyhow!("no viewer configured"))?;

    let resp = self
      .client
      .delete(self.url(&format!("/viewers/{viewer}/follows/{org_id}")))
      .send()
      .await
      .context("DELETE /follows failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("DELETE /follows → {}", resp.status()));
    }
    Ok(())
  }
}
