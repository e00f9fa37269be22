//! The detail resolver: full reports for one (department, status) pair.
//!
//! Index rows only project the key fields, so resolution is two-phase: an
//! index query for candidate keys, then one point lookup per candidate.

use futures::future::try_join_all;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  Error, Result,
  error::{StoreError, boxed},
  report::{Department, Report, Status},
  store::{IndexOrientation, IndexQuery, ReportStore},
};

/// An index row whose primary record could not be found.
#[derive(Debug, Error)]
#[error("index entry for report {0} has no matching record")]
pub struct MissingRecord(pub Uuid);

/// Return every report currently in `status` for `department`.
///
/// Point lookups run concurrently and are all awaited before returning. Any
/// failed or empty lookup fails the whole call with
/// [`Error::DetailsUnavailable`]; a partial list is never returned.
pub async fn resolve_details<S>(
  store: &S,
  orientation: IndexOrientation,
  department: Department,
  status: Status,
) -> Result<Vec<Report>>
where
  S: ReportStore,
{
  let query = IndexQuery { orientation, department, status };
  let entries = store
    .query_index(query)
    .await
    .map_err(|e| Error::DetailsUnavailable(boxed(e)))?;

  tracing::debug!(
    %department,
    %status,
    candidates = entries.len(),
    "resolving report details"
  );

  let lookups = entries.iter().map(|entry| async move {
    store
      .get_report(entry.key())
      .await
      .map_err(boxed)?
      .ok_or_else(|| -> StoreError { Box::new(MissingRecord(entry.report_id)) })
  });

  try_join_all(lookups).await.map_err(Error::DetailsUnavailable)
}
