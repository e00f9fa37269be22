//! [`ReportService`] — the composition root handed to the HTTP layer.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::{
  Error, Result,
  details::resolve_details,
  error::boxed,
  lifecycle::{self, StatusEvent, StatusUpdate, TransitionPolicy},
  report::{Department, NewReport, Report, Status},
  stats::{ReportStats, compute_stats},
  store::{AppendOutcome, IndexOrientation, ReportStore},
  timings::{StatusChangeTimes, compute_status_change_times},
};

/// Tunables for a [`ReportService`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceConfig {
  /// Which secondary index serves stats and detail queries.
  pub orientation: IndexOrientation,
  pub policy:      TransitionPolicy,
}

/// Report operations over an injected [`ReportStore`].
///
/// Cloning is cheap — the store is reference-counted.
pub struct ReportService<S> {
  store:  Arc<S>,
  config: ServiceConfig,
}

impl<S> Clone for ReportService<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: self.config }
  }
}

impl<S: ReportStore> ReportService<S> {
  pub fn new(store: Arc<S>, config: ServiceConfig) -> Self {
    Self { store, config }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn config(&self) -> ServiceConfig { self.config }

  // ── Reports ───────────────────────────────────────────────────────────

  /// Persist a new report with a fresh id and status [`Status::Report`].
  pub async fn create_report(&self, input: NewReport) -> Result<Uuid> {
    let report = Report {
      report_id:  Uuid::new_v4(),
      created_at: input.created_at.unwrap_or_else(Utc::now),
      department: input.department,
      status:     Status::Report,
      topic:      input.topic,
      details:    input.details,
      location:   input.location,
      username:   input.username,
    };
    let report_id = report.report_id;
    let department = report.department;

    self
      .store
      .put_report(report)
      .await
      .map_err(|e| Error::CreateFailed(boxed(e)))?;

    tracing::info!(%report_id, %department, "report created");
    Ok(report_id)
  }

  pub async fn get_report(&self, report_id: Uuid) -> Result<Report> {
    self
      .store
      .find_report(report_id)
      .await
      .map_err(|e| Error::LoadFailed(boxed(e)))?
      .ok_or(Error::NotFound(report_id))
  }

  /// Every report, unpaginated. Only suitable for bounded report volumes.
  pub async fn list_reports(&self) -> Result<Vec<Report>> {
    self
      .store
      .scan_reports()
      .await
      .map_err(|e| Error::LoadFailed(boxed(e)))
  }

  /// The report's status events across every log, oldest first.
  pub async fn report_history(&self, report_id: Uuid) -> Result<Vec<StatusEvent>> {
    // Distinguish "no events yet" from "no such report".
    self.get_report(report_id).await?;
    self
      .store
      .events_for(report_id)
      .await
      .map_err(|e| Error::LoadFailed(boxed(e)))
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Record a transition of `report_id` to `status` and return the new
  /// status.
  ///
  /// The target is validated before the store is touched, so an unknown
  /// status never produces a write.
  pub async fn update_status(
    &self,
    report_id: Uuid,
    status: &str,
    update: StatusUpdate,
  ) -> Result<Status> {
    let log = lifecycle::resolve(status)?;
    let target = log.status();

    let event = StatusEvent {
      report_id,
      status: target,
      comment: update.comment,
      updater: update.updater,
      updater_role: update.updater_role,
      created_at: update.created_at.unwrap_or_else(Utc::now),
    };

    let outcome = self
      .store
      .append_event(log, event, self.config.policy)
      .await
      .map_err(|e| Error::UpdateFailed(boxed(e)))?;
    match outcome {
      AppendOutcome::Appended => {}
      AppendOutcome::Missing => return Err(Error::NotFound(report_id)),
      AppendOutcome::Rejected { current } => {
        return Err(Error::TransitionRejected { from: current, to: target });
      }
    }

    tracing::info!(%report_id, status = %target, "report status updated");
    Ok(target)
  }

  // ── Dashboard queries ─────────────────────────────────────────────────

  pub async fn stats(&self) -> Result<ReportStats> {
    compute_stats(self.store.as_ref(), self.config.orientation).await
  }

  pub async fn details(
    &self,
    department: Department,
    status: Status,
  ) -> Result<Vec<Report>> {
    resolve_details(self.store.as_ref(), self.config.orientation, department, status)
      .await
  }

  /// [`Self::details`] for raw query-string values.
  pub async fn details_by_name(
    &self,
    department: &str,
    status: &str,
  ) -> Result<Vec<Report>> {
    let department: Department = department
      .parse()
      .map_err(|_| Error::InvalidDepartment(department.to_owned()))?;
    let status: Status = status
      .parse()
      .map_err(|_| Error::InvalidStatus(status.to_owned()))?;
    self.details(department, status).await
  }

  pub async fn status_change_times(&self) -> Result<StatusChangeTimes> {
    compute_status_change_times(self.store.as_ref()).await
  }
}
