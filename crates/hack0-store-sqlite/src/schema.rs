//! SQL schema for the hack0 SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS organizations (
    org_id      TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    country     TEXT,
    is_verified INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS events (
    event_id       TEXT PRIMARY KEY,
    title          TEXT NOT NULL,
    description    TEXT,
    url            TEXT,
    org_id         TEXT REFERENCES organizations(org_id),
    event_type     TEXT NOT NULL,   -- snake_case EventType discriminant
    status         TEXT,            -- 'draft'|'upcoming'|'open'|'ongoing'|'ended'
    start_at       TEXT,
    end_at         TEXT,
    country        TEXT,
    region         TEXT,
    format         TEXT,            -- 'virtual'|'in-person'|'hybrid'
    skill_level    TEXT,            -- 'beginner'|'intermediate'|'advanced'|'all'
    prize_pool     INTEGER,
    prize_currency TEXT,
    source_uid     TEXT,            -- calendar UID for imported events
    import_digest  TEXT,            -- content hash of the imported entry
    created_at     TEXT NOT NULL    -- ISO 8601 UTC; the feed cursor key
);

CREATE TABLE IF NOT EXISTS follows (
    viewer_id  TEXT NOT NULL,
    org_id     TEXT NOT NULL REFERENCES organizations(org_id),
    created_at TEXT NOT NULL,
    PRIMARY KEY (viewer_id, org_id)
);

CREATE TABLE IF NOT EXISTS preferences (
    viewer_id   TEXT PRIMARY KEY,
    region      TEXT,
    format      TEXT NOT NULL DEFAULT 'any',
    skill_level TEXT NOT NULL DEFAULT 'all'
);

CREATE INDEX IF NOT EXISTS events_created_idx ON events(created_at DESC);
CREATE INDEX IF NOT EXISTS events_org_idx     ON events(org_id);
CREATE UNIQUE INDEX IF NOT EXISTS events_import_idx
    ON events(org_id, source_uid) WHERE source_uid IS NOT NULL;
CREATE INDEX IF NOT EXISTS follows_viewer_idx ON follows(viewer_id);

PRAGMA user_version = 1;
";
