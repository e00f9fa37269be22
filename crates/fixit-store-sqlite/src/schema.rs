//! SQL schema for the fixit SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS reports (
    report_id   TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC
    department  TEXT NOT NULL,   -- 'HR' | 'Facility' | 'Production' | 'Finance' | 'Maintenance'
    status      TEXT NOT NULL,   -- 'Report' | 'Ack' | 'Processing' | 'Done'
    topic       TEXT NOT NULL,
    details     TEXT NOT NULL,
    location    TEXT NOT NULL,   -- JSON
    username    TEXT NOT NULL,
    PRIMARY KEY (report_id, created_at)
);

-- Secondary indexes. Each (department, status) query names one of these
-- explicitly with INDEXED BY.
CREATE INDEX IF NOT EXISTS reports_department_idx ON reports(department, created_at);
CREATE INDEX IF NOT EXISTS reports_status_idx     ON reports(status, created_at);

-- One log per post-creation status. Rows are never deleted; re-appending the
-- same (report_id, created_at) overwrites the descriptive columns.
CREATE TABLE IF NOT EXISTS report_ack (
    report_id    TEXT NOT NULL REFERENCES reports(report_id),
    comment      TEXT NOT NULL,
    updater      TEXT NOT NULL,
    updater_role TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (report_id, created_at)
);

CREATE TABLE IF NOT EXISTS report_processing (
    report_id    TEXT NOT NULL REFERENCES reports(report_id),
    comment      TEXT NOT NULL,
    updater      TEXT NOT NULL,
    updater_role TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (report_id, created_at)
);

CREATE TABLE IF NOT EXISTS report_done (
    report_id    TEXT NOT NULL REFERENCES reports(report_id),
    comment      TEXT NOT NULL,
    updater      TEXT NOT NULL,
    updater_role TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    PRIMARY KEY (report_id, created_at)
);

PRAGMA user_version = 1;
";
