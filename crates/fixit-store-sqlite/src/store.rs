//! [`SqliteStore`] — the SQLite implementation of [`ReportStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, TransactionBehavior};
use strum::IntoEnumIterator as _;
use uuid::Uuid;

use fixit_core::{
  lifecycle::{EventLog, StatusEvent, TransitionPolicy},
  report::{Report, ReportKey, Status},
  store::{AppendOutcome, IndexEntry, IndexOrientation, IndexQuery, ReportStore},
};

use crate::{
  Result,
  encode::{
    RawEntry, RawEvent, RawReport, decode_status, encode_department, encode_dt,
    encode_status, encode_uuid, event_table,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A report store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    tracing::debug!(path = %path.as_ref().display(), "opening sqlite store");
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
}

/// The `FROM ... WHERE ...` tail of an index query. The partition column is
/// always bound to the index's leading column; the other is a filter.
fn index_clause(orientation: IndexOrientation) -> &'static str {
  match orientation {
    IndexOrientation::ByDepartment => {
      "FROM reports INDEXED BY reports_department_idx
       WHERE department = ?1 AND status = ?2"
    }
    IndexOrientation::ByStatus => {
      "FROM reports INDEXED BY reports_status_idx
       WHERE status = ?2 AND department = ?1"
    }
  }
}

/// An append's result before the current status is decoded.
enum RawAppend {
  Appended,
  Missing,
  Rejected(String),
}

// ─── ReportStore impl ────────────────────────────────────────────────────────

impl ReportStore for SqliteStore {
  type Error = crate::Error;

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn put_report(&self, report: Report) -> Result<()> {
    let id_str       = encode_uuid(report.report_id);
    let at_str       = encode_dt(report.created_at);
    let department   = encode_department(report.department);
    let status       = encode_status(report.status);
    let location_str = report.location.to_string();
    let Report { topic, details, username, .. } = report;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             report_id, created_at, department, status,
             topic, details, location, username
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            at_str,
            department,
            status,
            topic,
            details,
            location_str,
            username,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_report(&self, key: ReportKey) -> Result<Option<Report>> {
    let id_str = encode_uuid(key.report_id);
    let at_str = encode_dt(key.created_at);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM reports WHERE report_id = ?1 AND created_at = ?2",
          RawReport::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str, at_str], RawReport::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  async fn find_report(&self, report_id: Uuid) -> Result<Option<Report>> {
    let id_str = encode_uuid(report_id);

    let raw: Option<RawReport> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM reports WHERE report_id = ?1",
          RawReport::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawReport::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReport::into_report).transpose()
  }

  async fn scan_reports(&self) -> Result<Vec<Report>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM reports", RawReport::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  // ── Secondary indexes ─────────────────────────────────────────────────────

  async fn query_index(&self, query: IndexQuery) -> Result<Vec<IndexEntry>> {
    let department = encode_department(query.department);
    let status     = encode_status(query.status);
    let sql = format!(
      "SELECT report_id, created_at, department, status {}",
      index_clause(query.orientation)
    );

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![department, status], RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn count_index(&self, query: IndexQuery) -> Result<usize> {
    let department = encode_department(query.department);
    let status     = encode_status(query.status);
    let sql = format!("SELECT COUNT(*) {}", index_clause(query.orientation));

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![department, status], |r| r.get(0))?)
      })
      .await?;

    Ok(usize::try_from(count).unwrap_or_default())
  }

  // ── Status events ─────────────────────────────────────────────────────────

  async fn append_event(
    &self,
    log: EventLog,
    event: StatusEvent,
    policy: TransitionPolicy,
  ) -> Result<AppendOutcome> {
    let table  = event_table(log);
    let target = log.status();
    let status = encode_status(target);
    let id_str = encode_uuid(event.report_id);
    let at_str = encode_dt(event.created_at);
    let StatusEvent { comment, updater, updater_role, .. } = event;
    let allowed: Vec<&'static str> = Status::iter()
      .filter(|from| policy.allows(*from, target))
      .map(encode_status)
      .collect();

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current: Option<String> = tx
          .query_row(
            "SELECT status FROM reports WHERE report_id = ?1",
            rusqlite::params![id_str],
            |r| r.get(0),
          )
          .optional()?;
        let Some(current) = current else {
          return Ok(RawAppend::Missing);
        };
        if !allowed.contains(&current.as_str()) {
          return Ok(RawAppend::Rejected(current));
        }
        tx.execute(
          "UPDATE reports SET status = ?1 WHERE report_id = ?2",
          rusqlite::params![status, id_str],
        )?;
        tx.execute(
          &format!(
            "INSERT INTO {table} (report_id, comment, updater, updater_role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (report_id, created_at) DO UPDATE SET
               comment      = excluded.comment,
               updater      = excluded.updater,
               updater_role = excluded.updater_role"
          ),
          rusqlite::params![id_str, comment, updater, updater_role, at_str],
        )?;
        tx.commit()?;
        Ok(RawAppend::Appended)
      })
      .await?;

    Ok(match raw {
      RawAppend::Appended => AppendOutcome::Appended,
      RawAppend::Missing => AppendOutcome::Missing,
      RawAppend::Rejected(current) => {
        AppendOutcome::Rejected { current: decode_status(&current)? }
      }
    })
  }

  async fn events_for(&self, report_id: Uuid) -> Result<Vec<StatusEvent>> {
    let id_str = encode_uuid(report_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut rows = Vec::new();
        for log in EventLog::iter() {
          let sql = format!(
            "SELECT {} FROM {} WHERE report_id = ?1",
            RawEvent::COLUMNS,
            event_table(log)
          );
          let mut stmt = conn.prepare(&sql)?;
          let found = stmt
            .query_map(rusqlite::params![id_str], |row| RawEvent::from_row(log, row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          rows.extend(found);
        }
        Ok(rows)
      })
      .await?;

    let mut events: Vec<StatusEvent> = raws
      .into_iter()
      .map(RawEvent::into_event)
      .collect::<Result<_>>()?;
    // Stored timestamps are not fixed-width, so order after decoding.
    events.sort_by_key(|e| e.created_at);
    Ok(events)
  }

  async fn scan_events(&self, log: EventLog) -> Result<Vec<StatusEvent>> {
    let sql = format!("SELECT {} FROM {}", RawEvent::COLUMNS, event_table(log));

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| RawEvent::from_row(log, row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
