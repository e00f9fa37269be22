//! Mock data for local development.
//!
//! Each generated report gets a random department and is advanced a random
//! number of lifecycle steps, each 1–20 days after the previous one.

use chrono::{Duration, Utc};
use fixit_core::{
  lifecycle::StatusUpdate,
  report::{Department, NewReport},
  service::ReportService,
  store::ReportStore,
};
use rand::{Rng, seq::SliceRandom};
use serde_json::json;
use strum::IntoEnumIterator;

const TOPICS: &[&str] = &[
  "Broken air conditioner",
  "Leaking pipe",
  "Payroll discrepancy",
  "Conveyor jam",
  "Flickering lights",
  "Missing invoice",
  "Door lock stuck",
];

const STEPS: [&str; 3] = ["Ack", "Processing", "Done"];

/// How many reports ended up at each stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
  pub created:    usize,
  pub acked:      usize,
  pub processing: usize,
  pub done:       usize,
}

/// Insert `count` mock reports through `service`.
pub async fn seed<S>(
  service: &ReportService<S>,
  count: usize,
  rng: &mut impl Rng,
) -> fixit_core::Result<SeedSummary>
where
  S: ReportStore,
{
  let departments: Vec<Department> = Department::iter().collect();
  let mut summary = SeedSummary::default();

  for n in 0..count {
    let department = *departments.choose(rng).unwrap_or(&Department::Facility);
    let topic = TOPICS.choose(rng).copied().unwrap_or("Maintenance request");
    let created_at = Utc::now() - Duration::days(rng.gen_range(0..90));

    let report_id = service
      .create_report(NewReport {
        department,
        topic: topic.to_owned(),
        details: format!("Mock report #{n}"),
        location: json!({
          "latitude": rng.gen_range(-90.0..90.0),
          "longitude": rng.gen_range(-180.0..180.0),
        }),
        username: format!("user{n}@example.com"),
        created_at: Some(created_at),
      })
      .await?;
    summary.created += 1;

    let mut at = created_at;
    for step in STEPS.iter().take(rng.gen_range(0..=STEPS.len())) {
      at += Duration::days(rng.gen_range(1..=20));
      let update = StatusUpdate {
        comment:      format!("{step} by mock worker"),
        updater:      format!("worker{}@example.com", rng.gen_range(0..10)),
        updater_role: format!("{department}-Worker"),
        created_at:   Some(at),
      };
      service.update_status(report_id, step, update).await?;
      match *step {
        "Ack" => summary.acked += 1,
        "Processing" => summary.processing += 1,
        _ => summary.done += 1,
      }
    }
  }

  tracing::info!(?summary, "seeded mock reports");
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use fixit_core::{report::Status, service::ServiceConfig};
  use fixit_store_sqlite::SqliteStore;
  use rand::{SeedableRng as _, rngs::StdRng};

  use super::*;

  #[tokio::test]
  async fn seeded_reports_match_summary_and_stats() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let svc = ReportService::new(Arc::new(store), ServiceConfig::default());

    let summary = seed(&svc, 40, &mut StdRng::seed_from_u64(7)).await.unwrap();
    assert_eq!(summary.created, 40);

    let stats = svc.stats().await.unwrap();
    assert_eq!(stats.total(), 40);

    // A report's current status is the last step it reached.
    let done: usize = stats.counts(Status::Done).iter().sum();
    let processing: usize = stats.counts(Status::Processing).iter().sum();
    let acked: usize = stats.counts(Status::Ack).iter().sum();
    assert_eq!(done, summary.done);
    assert_eq!(processing, summary.processing - summary.done);
    assert_eq!(acked, summary.acked - summary.processing);
  }
}
