//! [`SqliteStore`] — the SQLite implementation of [`DirectoryStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use hack0_core::{
  event::{Event, EventStatus, NewEvent},
  org::{NewOrganization, Organization, Organizer},
  preferences::Preferences,
  store::{DirectoryStore, EventQuery, ImportOutcome},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawOrganization, RawPreferences, decode_uuid, encode_dt,
    encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Row helpers ─────────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str = "
  e.event_id, e.title, e.description, e.url, e.org_id, e.event_type,
  e.status, e.start_at, e.end_at, e.country, e.region, e.format,
  e.skill_level, e.prize_pool, e.prize_currency, e.source_uid,
  e.import_digest, e.created_at,
  o.name, o.is_verified";

fn raw_event_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
  Ok(RawEvent {
    event_id:       row.get(0)?,
    title:          row.get(1)?,
    description:    row.get(2)?,
    url:            row.get(3)?,
    org_id:         row.get(4)?,
    event_type:     row.get(5)?,
    status:         row.get(6)?,
    start_at:       row.get(7)?,
    end_at:         row.get(8)?,
    country:        row.get(9)?,
    region:         row.get(10)?,
    format:         row.get(11)?,
    skill_level:    row.get(12)?,
    prize_pool:     row.get(13)?,
    prize_currency: row.get(14)?,
    source_uid:     row.get(15)?,
    import_digest:  row.get(16)?,
    created_at:     row.get(17)?,
    org_name:       row.get(18)?,
    org_verified:   row.get(19)?,
  })
}

fn raw_org_from_row(
  row: &rusqlite::Row<'_>,
) -> rusqlite::Result<RawOrganization> {
  Ok(RawOrganization {
    org_id:      row.get(0)?,
    name:        row.get(1)?,
    country:     row.get(2)?,
    is_verified: row.get(3)?,
    created_at:  row.get(4)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A hack0 directory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Event`] into the `events` table.
  async fn insert_event(&self, event: &Event) -> Result<()> {
    let event_id_str   = encode_uuid(event.event_id);
    let title          = event.title.clone();
    let description    = event.description.clone();
    let url            = event.url.clone();
    let org_id_str     = event.organizer.as_ref().map(|o| encode_uuid(o.org_id));
    let event_type_str = event.event_type.to_string();
    let status_str     = event.status.map(|s| s.to_string());
    let start_at_str   = event.start_at.map(encode_dt);
    let end_at_str     = event.end_at.map(encode_dt);
    let country        = event.country.clone();
    let region         = event.region.clone();
    let format_str     = event.format.map(|f| f.to_string());
    let skill_str      = event.skill_level.map(|l| l.to_string());
    let prize_pool     = event.prize_pool;
    let prize_currency = event.prize_currency.clone();
    let source_uid     = event.source_uid.clone();
    let import_digest  = event.import_digest.clone();
    let created_at_str = encode_dt(event.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO events (
             event_id, title, description, url, org_id, event_type,
             status, start_at, end_at, country, region, format,
             skill_level, prize_pool, prize_currency, source_uid,
             import_digest, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17, ?18)",
          rusqlite::params![
            event_id_str,
            title,
            description,
            url,
            org_id_str,
            event_type_str,
            status_str,
            start_at_str,
            end_at_str,
            country,
            region,
            format_str,
            skill_str,
            prize_pool,
            prize_currency,
            source_uid,
            import_digest,
            created_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Resolve `org_id` into an embedded [`Organizer`] reference.
  async fn resolve_organizer(
    &self,
    org_id: Option<Uuid>,
  ) -> Result<Option<Organizer>> {
    let Some(org_id) = org_id else { return Ok(None) };
    let org = self
      .get_organization(org_id)
      .await?
      .ok_or(Error::OrganizationNotFound(org_id))?;
    Ok(Some(Organizer {
      org_id:      org.org_id,
      name:        org.name,
      is_verified: org.is_verified,
    }))
  }
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = Error;

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn add_organization(&self, input: NewOrganization) -> Result<Organization> {
    let org = Organization {
      org_id:      Uuid::new_v4(),
      name:        input.name,
      country:     input.country,
      is_verified: false,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(org.org_id);
    let name     = org.name.clone();
    let country  = org.country.clone();
    let at_str   = encode_dt(org.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO organizations (org_id, name, country, is_verified, created_at)
           VALUES (?1, ?2, ?3, 0, ?4)",
          rusqlite::params![id_str, name, country, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(org)
  }

  async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT org_id, name, country, is_verified, created_at
               FROM organizations WHERE org_id = ?1",
              rusqlite::params![id_str],
              raw_org_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn list_organizations(&self) -> Result<Vec<Organization>> {
    let raws: Vec<RawOrganization> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT org_id, name, country, is_verified, created_at
           FROM organizations ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map([], raw_org_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawOrganization::into_organization)
      .collect()
  }

  async fn set_verified(&self, id: Uuid, verified: bool) -> Result<Organization> {
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE organizations SET is_verified = ?1 WHERE org_id = ?2",
          rusqlite::params![verified, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::OrganizationNotFound(id));
    }
    self
      .get_organization(id)
      .await?
      .ok_or(Error::OrganizationNotFound(id))
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    let organizer = self.resolve_organizer(input.org_id).await?;

    let event = Event {
      event_id: Uuid::new_v4(),
      title: input.title,
      description: input.description,
      url: input.url,
      organizer,
      event_type: input.event_type,
      status: input.status,
      start_at: input.start_at,
      end_at: input.end_at,
      country: input.country,
      region: input.region,
      format: input.format,
      skill_level: input.skill_level,
      prize_pool: input.prize_pool,
      prize_currency: input.prize_currency,
      source_uid: input.source_uid,
      import_digest: input.import_digest,
      created_at: Utc::now(),
    };

    self.insert_event(&event).await?;
    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {EVENT_COLUMNS}
                 FROM events e
                 LEFT JOIN organizations o ON o.org_id = e.org_id
                 WHERE e.event_id = ?1"
              ),
              rusqlite::params![id_str],
              raw_event_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn fetch_events(&self, query: &EventQuery) -> Result<Vec<Event>> {
    let created_before = query.created_before.map(encode_dt);
    let min_end_at     = query.min_end_at.map(encode_dt);
    let limit          = query.limit as i64;

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS}
           FROM events e
           LEFT JOIN organizations o ON o.org_id = e.org_id
           WHERE (?1 IS NULL OR e.created_at < ?1)
             AND (?2 IS NULL OR e.end_at IS NULL OR e.end_at >= ?2)
           ORDER BY e.created_at DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![created_before, min_end_at, limit],
            raw_event_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn set_event_status(&self, id: Uuid, status: EventStatus) -> Result<Event> {
    let id_str     = encode_uuid(id);
    let status_str = status.to_string();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE events SET status = ?1 WHERE event_id = ?2",
          rusqlite::params![status_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EventNotFound(id));
    }
    self.get_event(id).await?.ok_or(Error::EventNotFound(id))
  }

  async fn upsert_imported_event(
    &self,
    input: NewEvent,
  ) -> Result<(Event, ImportOutcome)> {
    let source_uid = input
      .source_uid
      .clone()
      .ok_or(Error::MissingSourceUid)?;
    let org_id_str = input.org_id.map(encode_uuid);

    // `IS` rather than `=` so a missing org matches a NULL column.
    let existing: Option<(String, Option<String>)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT event_id, import_digest FROM events
               WHERE org_id IS ?1 AND source_uid = ?2",
              rusqlite::params![org_id_str, source_uid],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((id_str, stored_digest)) = existing else {
      let event = self.add_event(input).await?;
      return Ok((event, ImportOutcome::Created));
    };

    let event_id = decode_uuid(&id_str)?;

    if stored_digest == input.import_digest {
      let event = self
        .get_event(event_id)
        .await?
        .ok_or(Error::EventNotFound(event_id))?;
      return Ok((event, ImportOutcome::Unchanged));
    }

    let title          = input.title;
    let description    = input.description;
    let url            = input.url;
    let event_type_str = input.event_type.to_string();
    let status_str     = input.status.map(|s| s.to_string());
    let start_at_str   = input.start_at.map(encode_dt);
    let end_at_str     = input.end_at.map(encode_dt);
    let country        = input.country;
    let region         = input.region;
    let format_str     = input.format.map(|f| f.to_string());
    let skill_str      = input.skill_level.map(|l| l.to_string());
    let prize_pool     = input.prize_pool;
    let prize_currency = input.prize_currency;
    let import_digest  = input.import_digest;
    let update_id_str  = encode_uuid(event_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE events SET
             title = ?1, description = ?2, url = ?3, event_type = ?4,
             status = ?5, start_at = ?6, end_at = ?7, country = ?8,
             region = ?9, format = ?10, skill_level = ?11,
             prize_pool = ?12, prize_currency = ?13, import_digest = ?14
           WHERE event_id = ?15",
          rusqlite::params![
            title,
            description,
            url,
            event_type_str,
            status_str,
            start_at_str,
            end_at_str,
            country,
            region,
            format_str,
            skill_str,
            prize_pool,
            prize_currency,
            import_digest,
            update_id_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    let event = self
      .get_event(event_id)
      .await?
      .ok_or(Error::EventNotFound(event_id))?;
    Ok((event, ImportOutcome::Updated))
  }

  // ── Follows ───────────────────────────────────────────────────────────────

  async fn follow(&self, viewer_id: Uuid, org_id: Uuid) -> Result<()> {
    if self.get_organization(org_id).await?.is_none() {
      return Err(Error::OrganizationNotFound(org_id));
    }

    let viewer_str = encode_uuid(viewer_id);
    let org_str    = encode_uuid(org_id);
    let at_str     = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO follows (viewer_id, org_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![viewer_str, org_str, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn unfollow(&self, viewer_id: Uuid, org_id: Uuid) -> Result<()> {
    let viewer_str = encode_uuid(viewer_id);
    let org_str    = encode_uuid(org_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM follows WHERE viewer_id = ?1 AND org_id = ?2",
          rusqlite::params![viewer_str, org_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn followed_organizations(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>> {
    let viewer_str = encode_uuid(viewer_id);

    let id_strs: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT org_id FROM follows WHERE viewer_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![viewer_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    id_strs.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Preferences ───────────────────────────────────────────────────────────

  async fn set_preferences(&self, prefs: Preferences) -> Result<Preferences> {
    let viewer_str = encode_uuid(prefs.viewer_id);
    let region     = prefs.region.clone();
    let format_str = prefs.format.to_string();
    let skill_str  = prefs.skill_level.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO preferences (viewer_id, region, format, skill_level)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(viewer_id) DO UPDATE SET
             region = excluded.region,
             format = excluded.format,
             skill_level = excluded.skill_level",
          rusqlite::params![viewer_str, region, format_str, skill_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(prefs)
  }

  async fn get_preferences(&self, viewer_id: Uuid) -> Result<Option<Preferences>> {
    let viewer_str = encode_uuid(viewer_id);

    let raw: Option<RawPreferences> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT viewer_id, region, format, skill_level
               FROM preferences WHERE viewer_id = ?1",
              rusqlite::params![viewer_str],
              |row| {
                Ok(RawPreferences {
                  viewer_id:   row.get(0)?,
                  region:      row.get(1)?,
                  format:      row.get(2)?,
                  skill_level: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPreferences::into_preferences).transpose()
  }
}
