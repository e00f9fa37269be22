//! Mean time spent in each lifecycle stage, per department.
//!
//! For every report the earliest event in each log is taken as the moment it
//! entered that stage. The three steps measured are Report→Ack,
//! Ack→Processing and Processing→Done, in fractional days.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::boxed,
  lifecycle::EventLog,
  report::Department,
  store::ReportStore,
};

/// Department → mean duration of each of the three lifecycle steps.
pub type StatusChangeTimes = BTreeMap<Department, [f64; 3]>;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Default)]
struct StepMeans {
  sums:   [f64; 3],
  counts: [u32; 3],
}

impl StepMeans {
  fn add(&mut self, step: usize, days: f64) {
    self.sums[step] += days;
    self.counts[step] += 1;
  }

  fn means(&self) -> [f64; 3] {
    std::array::from_fn(|i| match self.counts[i] {
      0 => 0.0,
      n => self.sums[i] / f64::from(n),
    })
  }
}

/// Compute [`StatusChangeTimes`] from the reports and every event log.
///
/// Every department is present in the result; steps no report has completed
/// are reported as `0.0`. Steps whose end precedes their start are skipped.
pub async fn compute_status_change_times<S>(store: &S) -> Result<StatusChangeTimes>
where
  S: ReportStore,
{
  let logs: Vec<EventLog> = EventLog::iter().collect();
  let (reports, events) = futures::try_join!(
    store.scan_reports(),
    try_join_all(logs.iter().map(|&log| store.scan_events(log))),
  )
  .map_err(|e| Error::StatsUnavailable(boxed(e)))?;

  // Earliest entry into each stage, indexed like `logs`.
  let entered: Vec<HashMap<Uuid, DateTime<Utc>>> = events
    .into_iter()
    .map(|log_events| {
      let mut first: HashMap<Uuid, DateTime<Utc>> = HashMap::new();
      for ev in log_events {
        first
          .entry(ev.report_id)
          .and_modify(|at| *at = (*at).min(ev.created_at))
          .or_insert(ev.created_at);
      }
      first
    })
    .collect();

  let mut acc: BTreeMap<Department, StepMeans> =
    Department::iter().map(|d| (d, StepMeans::default())).collect();

  for report in &reports {
    let mut stamps = vec![Some(report.created_at)];
    stamps.extend(entered.iter().map(|m| m.get(&report.report_id).copied()));

    let means = acc.entry(report.department).or_default();
    for (step, pair) in stamps.windows(2).enumerate() {
      if let [Some(start), Some(end)] = pair
        && end >= start
      {
        let millis = (*end - *start).num_milliseconds() as f64;
        means.add(step, millis / MILLIS_PER_DAY);
      }
    }
  }

  Ok(acc.into_iter().map(|(d, m)| (d, m.means())).collect())
}
