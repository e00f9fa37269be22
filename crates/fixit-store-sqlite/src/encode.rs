//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase strings,
//! `location` is compact JSON, and enumerations use their wire names.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use fixit_core::{
  lifecycle::{EventLog, StatusEvent},
  report::{Department, Report, Status},
  store::IndexEntry,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Department / Status ─────────────────────────────────────────────────────

pub fn encode_department(d: Department) -> &'static str { d.into() }

pub fn decode_department(s: &str) -> Result<Department> {
  Department::from_str(s).map_err(|_| Error::UnknownVariant {
    column: "department",
    value:  s.to_owned(),
  })
}

pub fn encode_status(s: Status) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<Status> {
  Status::from_str(s).map_err(|_| Error::UnknownVariant {
    column: "status",
    value:  s.to_owned(),
  })
}

// ─── EventLog ────────────────────────────────────────────────────────────────

/// The table backing each status event log.
pub fn event_table(log: EventLog) -> &'static str {
  match log {
    EventLog::ReportAck => "report_ack",
    EventLog::ReportProcessing => "report_processing",
    EventLog::ReportDone => "report_done",
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub report_id:  String,
  pub created_at: String,
  pub department: String,
  pub status:     String,
  pub topic:      String,
  pub details:    String,
  pub location:   String,
  pub username:   String,
}

impl RawReport {
  /// Column list matching [`RawReport::from_row`].
  pub const COLUMNS: &'static str =
    "report_id, created_at, department, status, topic, details, location, username";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      report_id:  row.get(0)?,
      created_at: row.get(1)?,
      department: row.get(2)?,
      status:     row.get(3)?,
      topic:      row.get(4)?,
      details:    row.get(5)?,
      location:   row.get(6)?,
      username:   row.get(7)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:  decode_uuid(&self.report_id)?,
      created_at: decode_dt(&self.created_at)?,
      department: decode_department(&self.department)?,
      status:     decode_status(&self.status)?,
      topic:      self.topic,
      details:    self.details,
      location:   serde_json::from_str(&self.location)?,
      username:   self.username,
    })
  }
}

/// Raw strings read from a secondary-index projection of `reports`.
pub struct RawEntry {
  pub report_id:  String,
  pub created_at: String,
  pub department: String,
  pub status:     String,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      report_id:  row.get(0)?,
      created_at: row.get(1)?,
      department: row.get(2)?,
      status:     row.get(3)?,
    })
  }

  pub fn into_entry(self) -> Result<IndexEntry> {
    Ok(IndexEntry {
      report_id:  decode_uuid(&self.report_id)?,
      created_at: decode_dt(&self.created_at)?,
      department: decode_department(&self.department)?,
      status:     decode_status(&self.status)?,
    })
  }
}

/// Raw strings read from one of the event log tables. The status is implied
/// by the table, so it is carried alongside rather than read from a column.
pub struct RawEvent {
  pub log:          EventLog,
  pub report_id:    String,
  pub comment:      String,
  pub updater:      String,
  pub updater_role: String,
  pub created_at:   String,
}

impl RawEvent {
  pub const COLUMNS: &'static str = "report_id, comment, updater, updater_role, created_at";

  pub fn from_row(log: EventLog, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      log,
      report_id:    row.get(0)?,
      comment:      row.get(1)?,
      updater:      row.get(2)?,
      updater_role: row.get(3)?,
      created_at:   row.get(4)?,
    })
  }

  pub fn into_event(self) -> Result<StatusEvent> {
    Ok(StatusEvent {
      report_id:    decode_uuid(&self.report_id)?,
      status:       self.log.status(),
      comment:      self.comment,
      updater:      self.updater,
      updater_role: self.updater_role,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}
