//! SQL schema for the wardwatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.
//!
//! Deletes never run cleanup code: the foreign-key actions below decide what
//! happens to dependent rows.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS wards (
    ward_id       TEXT PRIMARY KEY,
    ward_name     TEXT NOT NULL UNIQUE,
    supervisor_id TEXT REFERENCES workers(worker_id) ON DELETE SET NULL,
    created_at    TEXT NOT NULL      -- RFC 3339 UTC, fixed width
);

CREATE TABLE IF NOT EXISTS workers (
    worker_id      TEXT PRIMARY KEY,
    worker_name    TEXT NOT NULL,
    contact_number TEXT NOT NULL UNIQUE,
    ward_id        TEXT REFERENCES wards(ward_id)
                        ON UPDATE CASCADE ON DELETE SET NULL,
    status         INTEGER NOT NULL DEFAULT 0,   -- 1 = active
    date_created   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS trackers (
    tracker_id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at TEXT NOT NULL,
    method     TEXT NOT NULL DEFAULT 'nfc',       -- 'nfc' | 'qr_code'
    house_id   TEXT REFERENCES households(house_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS households (
    house_id     TEXT PRIMARY KEY,
    owner_number TEXT NOT NULL UNIQUE,
    address      TEXT NOT NULL,
    status       TEXT NOT NULL DEFAULT 'active', -- 'active' | 'inactive' | 'suspended'
    ward_id      TEXT REFERENCES wards(ward_id) ON DELETE SET NULL,
    tracker_id   INTEGER REFERENCES trackers(tracker_id) ON DELETE SET NULL,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scan_logs (
    scan_id       TEXT PRIMARY KEY,
    house_id      TEXT NOT NULL REFERENCES households(house_id) ON DELETE CASCADE,
    worker_id     TEXT REFERENCES workers(worker_id) ON DELETE SET NULL,
    timestamp     TEXT NOT NULL,
    gps_latitude  REAL,
    gps_longitude REAL,
    sync_status   INTEGER NOT NULL DEFAULT 0,
    scan_method   TEXT NOT NULL DEFAULT 'nfc'   -- 'nfc' | 'manual'
);

CREATE TABLE IF NOT EXISTS citizen_reports (
    report_id        TEXT PRIMARY KEY,
    house_id         TEXT NOT NULL REFERENCES households(house_id) ON DELETE CASCADE,
    citizen_contact  TEXT NOT NULL,
    timestamp        TEXT NOT NULL,
    status           TEXT NOT NULL DEFAULT 'open',
    priority         TEXT,                       -- 'low' | 'medium' | 'high'
    additional_notes TEXT
);

CREATE INDEX IF NOT EXISTS workers_ward_idx       ON workers(ward_id);
CREATE INDEX IF NOT EXISTS workers_created_idx    ON workers(date_created);
CREATE INDEX IF NOT EXISTS wards_created_idx      ON wards(created_at);
CREATE INDEX IF NOT EXISTS households_ward_idx    ON households(ward_id);
CREATE INDEX IF NOT EXISTS households_created_idx ON households(date_created);
CREATE INDEX IF NOT EXISTS scan_logs_house_idx    ON scan_logs(house_id);
CREATE INDEX IF NOT EXISTS scan_logs_worker_idx   ON scan_logs(worker_id);
CREATE INDEX IF NOT EXISTS reports_house_idx      ON citizen_reports(house_id);

PRAGMA user_version = 1;
";
