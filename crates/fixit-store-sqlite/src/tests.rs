//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone as _, Utc};
use fixit_core::{
  Error as CoreError,
  lifecycle::{EventLog, StatusEvent, StatusUpdate, TransitionPolicy},
  report::{Department, NewReport, Report, ReportKey, Status},
  service::{ReportService, ServiceConfig},
  store::{AppendOutcome, IndexOrientation, IndexQuery, ReportStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 9, 25, 9, 30, 0).unwrap() }

fn report(department: Department, created_at: DateTime<Utc>) -> Report {
  Report {
    report_id: Uuid::new_v4(),
    created_at,
    department,
    status: Status::Report,
    topic: "Air conditioning".into(),
    details: "Too cold in the meeting room".into(),
    location: serde_json::json!({ "latitude": 13.75, "longitude": 100.5 }),
    username: "somchai@example.com".into(),
  }
}

fn event(report_id: Uuid, status: Status, created_at: DateTime<Utc>) -> StatusEvent {
  StatusEvent {
    report_id,
    status,
    comment: "checked".into(),
    updater: "lek@example.com".into(),
    updater_role: "Facility-Worker".into(),
    created_at,
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn put_and_find_report() {
  let s = store().await;
  let r = report(Department::Facility, t0());
  s.put_report(r.clone()).await.unwrap();

  assert_eq!(s.find_report(r.report_id).await.unwrap(), Some(r.clone()));
  assert_eq!(s.get_report(r.key()).await.unwrap(), Some(r));
}

#[tokio::test]
async fn get_report_requires_full_key() {
  let s = store().await;
  let r = report(Department::Facility, t0());
  s.put_report(r.clone()).await.unwrap();

  let wrong = ReportKey { report_id: r.report_id, created_at: t0() + Duration::seconds(1) };
  assert!(s.get_report(wrong).await.unwrap().is_none());
}

#[tokio::test]
async fn find_missing_report_returns_none() {
  let s = store().await;
  assert!(s.find_report(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_report_id_is_rejected() {
  let s = store().await;
  let r = report(Department::Hr, t0());
  s.put_report(r.clone()).await.unwrap();
  assert!(s.put_report(r).await.is_err());
}

#[tokio::test]
async fn scan_empty_store() {
  let s = store().await;
  assert!(s.scan_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn plain_string_location_roundtrip() {
  let s = store().await;
  let mut r = report(Department::Finance, t0());
  r.location = serde_json::json!("Building B, floor 4");
  s.put_report(r.clone()).await.unwrap();
  assert_eq!(s.find_report(r.report_id).await.unwrap().unwrap().location, r.location);
}

// ─── Indexes ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn index_query_and_count_agree_across_orientations() {
  let s = store().await;
  for i in 0..3 {
    s.put_report(report(Department::Production, t0() + Duration::minutes(i)))
      .await
      .unwrap();
  }
  s.put_report(report(Department::Hr, t0())).await.unwrap();

  for orientation in [IndexOrientation::ByDepartment, IndexOrientation::ByStatus] {
    let q = IndexQuery { orientation, department: Department::Production, status: Status::Report };
    let entries = s.query_index(q).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| e.department == Department::Production));
    assert_eq!(s.count_index(q).await.unwrap(), 3);

    let q = IndexQuery { orientation, department: Department::Production, status: Status::Ack };
    assert_eq!(s.count_index(q).await.unwrap(), 0);
    assert!(s.query_index(q).await.unwrap().is_empty());
  }
}

#[tokio::test]
async fn index_entry_key_resolves_to_record() {
  let s = store().await;
  let r = report(Department::Maintenance, t0());
  s.put_report(r.clone()).await.unwrap();

  let q = IndexQuery {
    orientation: IndexOrientation::ByStatus,
    department:  Department::Maintenance,
    status:      Status::Report,
  };
  let entry = s.query_index(q).await.unwrap().pop().unwrap();
  assert_eq!(s.get_report(entry.key()).await.unwrap(), Some(r));
}

// ─── Status events ───────────────────────────────────────────────────────────

#[tokio::test]
async fn append_event_moves_status() {
  let s = store().await;
  let r = report(Department::Facility, t0());
  s.put_report(r.clone()).await.unwrap();

  let outcome = s
    .append_event(
      EventLog::ReportAck,
      event(r.report_id, Status::Ack, t0() + Duration::hours(1)),
      TransitionPolicy::Unconstrained,
    )
    .await
    .unwrap();
  assert_eq!(outcome, AppendOutcome::Appended);

  assert_eq!(s.find_report(r.report_id).await.unwrap().unwrap().status, Status::Ack);
  assert_eq!(s.scan_events(EventLog::ReportAck).await.unwrap().len(), 1);
  assert!(s.scan_events(EventLog::ReportDone).await.unwrap().is_empty());
}

#[tokio::test]
async fn append_event_for_missing_report_writes_nothing() {
  let s = store().await;
  let id = Uuid::new_v4();
  let outcome = s
    .append_event(EventLog::ReportDone, event(id, Status::Done, t0()), TransitionPolicy::Unconstrained)
    .await
    .unwrap();
  assert_eq!(outcome, AppendOutcome::Missing);
  assert!(s.scan_events(EventLog::ReportDone).await.unwrap().is_empty());
}

#[tokio::test]
async fn events_for_unions_logs_in_time_order() {
  let s = store().await;
  let r = report(Department::Hr, t0());
  s.put_report(r.clone()).await.unwrap();

  let id = r.report_id;
  let free = TransitionPolicy::Unconstrained;
  s.append_event(EventLog::ReportDone, event(id, Status::Done, t0() + Duration::days(9)), free)
    .await
    .unwrap();
  s.append_event(EventLog::ReportAck, event(id, Status::Ack, t0() + Duration::days(1)), free)
    .await
    .unwrap();
  s.append_event(
    EventLog::ReportProcessing,
    event(id, Status::Processing, t0() + Duration::days(4)),
    free,
  )
  .await
  .unwrap();

  let statuses: Vec<Status> =
    s.events_for(id).await.unwrap().into_iter().map(|e| e.status).collect();
  assert_eq!(statuses, [Status::Ack, Status::Processing, Status::Done]);
  // The last append wins for the current status.
  assert_eq!(s.find_report(id).await.unwrap().unwrap().status, Status::Processing);
}

#[tokio::test]
async fn append_event_checks_policy_against_committed_status() {
  let s = store().await;
  let r = report(Department::Finance, t0());
  s.put_report(r.clone()).await.unwrap();
  let id = r.report_id;
  let forward = TransitionPolicy::ForwardOnly;

  let outcome = s
    .append_event(EventLog::ReportDone, event(id, Status::Done, t0() + Duration::days(1)), forward)
    .await
    .unwrap();
  assert_eq!(outcome, AppendOutcome::Appended);

  let outcome = s
    .append_event(EventLog::ReportAck, event(id, Status::Ack, t0() + Duration::days(2)), forward)
    .await
    .unwrap();
  assert_eq!(outcome, AppendOutcome::Rejected { current: Status::Done });
  assert_eq!(s.find_report(id).await.unwrap().unwrap().status, Status::Done);
  assert!(s.scan_events(EventLog::ReportAck).await.unwrap().is_empty());
}

#[tokio::test]
async fn reappending_same_event_time_overwrites() {
  let s = store().await;
  let r = report(Department::Hr, t0());
  s.put_report(r.clone()).await.unwrap();

  let first = event(r.report_id, Status::Ack, t0() + Duration::hours(3));
  let mut second = first.clone();
  second.comment = "checked twice".into();
  for e in [first, second] {
    let outcome = s
      .append_event(EventLog::ReportAck, e, TransitionPolicy::Unconstrained)
      .await
      .unwrap();
    assert_eq!(outcome, AppendOutcome::Appended);
  }

  let events = s.scan_events(EventLog::ReportAck).await.unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0].comment, "checked twice");
}

// ─── Service over SQLite ─────────────────────────────────────────────────────

fn service(store: SqliteStore, orientation: IndexOrientation) -> ReportService<SqliteStore> {
  ReportService::new(Arc::new(store), ServiceConfig { orientation, ..Default::default() })
}

#[tokio::test]
async fn service_create_update_and_query() {
  let svc = service(store().await, IndexOrientation::ByDepartment);

  let mut input = NewReport::new(Department::Facility, "Broken window");
  input.created_at = Some(t0());
  input.username = "nok@example.com".into();
  let id = svc.create_report(input).await.unwrap();

  let fetched = svc.get_report(id).await.unwrap();
  assert_eq!(fetched.status, Status::Report);
  assert_eq!(fetched.topic, "Broken window");
  assert_eq!(fetched.username, "nok@example.com");

  let update = StatusUpdate { created_at: Some(t0() + Duration::days(1)), ..Default::default() };
  svc.update_status(id, "Ack", update).await.unwrap();

  let acked = svc.details(Department::Facility, Status::Ack).await.unwrap();
  assert_eq!(acked.len(), 1);
  assert_eq!(acked[0].report_id, id);

  let stats = svc.stats().await.unwrap();
  assert_eq!(stats.ack_counts, [0, 1, 0, 0, 0]);
  assert_eq!(stats.total(), 1);
}

#[tokio::test]
async fn service_stats_identical_for_both_orientations() {
  let store = store().await;
  let by_dept = service(store.clone(), IndexOrientation::ByDepartment);
  let by_status = service(store, IndexOrientation::ByStatus);

  let departments = [Department::Hr, Department::Finance, Department::Finance, Department::Production];
  for (i, d) in departments.into_iter().enumerate() {
    let id = by_dept.create_report(NewReport::new(d, format!("issue {i}"))).await.unwrap();
    if i % 2 == 0 {
      by_dept.update_status(id, "Processing", StatusUpdate::default()).await.unwrap();
    }
  }

  let a = by_dept.stats().await.unwrap();
  let b = by_status.stats().await.unwrap();
  assert_eq!(a, b);
  assert_eq!(a.total(), 4);
}

#[tokio::test]
async fn service_resubmitted_update_succeeds() {
  let svc = service(store().await, IndexOrientation::ByDepartment);
  let id = svc.create_report(NewReport::new(Department::Hr, "Payroll")).await.unwrap();

  let update = StatusUpdate { created_at: Some(t0()), ..Default::default() };
  svc.update_status(id, "Ack", update.clone()).await.unwrap();
  assert_eq!(svc.update_status(id, "Ack", update).await.unwrap(), Status::Ack);
  assert_eq!(svc.report_history(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn service_forward_only_holds_under_concurrent_updates() {
  let svc = ReportService::new(
    Arc::new(store().await),
    ServiceConfig { policy: TransitionPolicy::ForwardOnly, ..Default::default() },
  );

  for i in 0..20 {
    let id = svc
      .create_report(NewReport::new(Department::Maintenance, format!("lift {i}")))
      .await
      .unwrap();
    let done = svc.clone();
    let ack = svc.clone();
    let (done, ack) = tokio::join!(
      tokio::spawn(async move { done.update_status(id, "Done", StatusUpdate::default()).await }),
      tokio::spawn(async move { ack.update_status(id, "Ack", StatusUpdate::default()).await }),
    );
    done.unwrap().unwrap();
    if let Err(err) = ack.unwrap() {
      assert!(matches!(
        err,
        CoreError::TransitionRejected { from: Status::Done, to: Status::Ack }
      ));
    }
    assert_eq!(svc.get_report(id).await.unwrap().status, Status::Done);
  }
}

#[tokio::test]
async fn service_list_empty_store() {
  let svc = service(store().await, IndexOrientation::ByStatus);
  assert!(svc.list_reports().await.unwrap().is_empty());
}
