//! Error types for `fixit-core`.
//!
//! Store failures are wrapped opaquely: the boxed source is kept for logging
//! but never rendered into client-facing messages.

use thiserror::Error;
use uuid::Uuid;

use crate::report::Status;

/// A boxed error coming out of a [`ReportStore`](crate::store::ReportStore).
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("report not found: {0}")]
  NotFound(Uuid),

  #[error("invalid status: {0:?}")]
  InvalidStatus(String),

  #[error("unknown department: {0:?}")]
  InvalidDepartment(String),

  #[error("transition from {from} to {to} is not allowed")]
  TransitionRejected { from: Status, to: Status },

  #[error("could not create report")]
  CreateFailed(#[source] StoreError),

  #[error("could not load report data")]
  LoadFailed(#[source] StoreError),

  #[error("could not update report status")]
  UpdateFailed(#[source] StoreError),

  #[error("report stats unavailable")]
  StatsUnavailable(#[source] StoreError),

  #[error("report details unavailable")]
  DetailsUnavailable(#[source] StoreError),
}

impl Error {
  /// `true` for failures caused by the caller's input rather than the store.
  pub fn is_client_error(&self) -> bool {
    matches!(
      self,
      Self::NotFound(_)
        | Self::InvalidStatus(_)
        | Self::InvalidDepartment(_)
        | Self::TransitionRejected { .. }
    )
  }
}

/// Box a backend error for one of the store-failure variants.
pub(crate) fn boxed<E>(e: E) -> StoreError
where
  E: std::error::Error + Send + Sync + 'static,
{
  Box::new(e)
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
