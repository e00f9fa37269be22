//! The aggregation engine: report counts per department × status.
//!
//! One index count is issued per cell of the matrix. The cells are independent
//! and run concurrently; the matrix is only assembled once every count is in.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
  Error, Result,
  error::boxed,
  report::{Department, Status},
  store::{IndexOrientation, IndexQuery, ReportStore},
};

/// Dashboard counts, one vector per status. The `i`-th entry of every vector
/// belongs to `departments[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
  pub departments:       Vec<Department>,
  pub report_counts:     Vec<usize>,
  pub ack_counts:        Vec<usize>,
  pub processing_counts: Vec<usize>,
  pub done_counts:       Vec<usize>,
}

impl ReportStats {
  /// The per-department vector for `status`.
  pub fn counts(&self, status: Status) -> &[usize] {
    match status {
      Status::Report => &self.report_counts,
      Status::Ack => &self.ack_counts,
      Status::Processing => &self.processing_counts,
      Status::Done => &self.done_counts,
    }
  }

  /// Sum over every cell of the matrix.
  pub fn total(&self) -> usize {
    Status::iter().map(|s| self.counts(s).iter().sum::<usize>()).sum()
  }
}

/// Build the department × status count matrix using the index selected by
/// `orientation`.
///
/// All-or-nothing: if any cell query fails the whole call fails with
/// [`Error::StatsUnavailable`] and the outstanding queries are dropped.
pub async fn compute_stats<S>(
  store: &S,
  orientation: IndexOrientation,
) -> Result<ReportStats>
where
  S: ReportStore,
{
  let departments: Vec<Department> = Department::iter().collect();
  let cells: Vec<IndexQuery> = departments
    .iter()
    .flat_map(|&department| {
      Status::iter().map(move |status| IndexQuery {
        orientation,
        department,
        status,
      })
    })
    .collect();

  tracing::debug!(cells = cells.len(), ?orientation, "computing report stats");

  let counts = try_join_all(cells.iter().map(|&q| store.count_index(q)))
    .await
    .map_err(|e| Error::StatsUnavailable(boxed(e)))?;

  // Cells are department-major, so pushing in order keeps every status
  // vector aligned with `departments`.
  let mut by_status: BTreeMap<Status, Vec<usize>> = Status::iter()
    .map(|s| (s, Vec::with_capacity(departments.len())))
    .collect();
  for (cell, count) in cells.iter().zip(counts) {
    by_status.entry(cell.status).or_default().push(count);
  }

  let mut take = |s: Status| by_status.remove(&s).unwrap_or_default();
  Ok(ReportStats {
    report_counts: take(Status::Report),
    ack_counts: take(Status::Ack),
    processing_counts: take(Status::Processing),
    done_counts: take(Status::Done),
    departments,
  })
}
