//! Status events and the lifecycle resolver.
//!
//! Every transition out of the initial [`Status::Report`] state is recorded as
//! a [`StatusEvent`] in one of three append-only logs, selected by the target
//! status. A report's history is the union of its events across those logs.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use uuid::Uuid;

use crate::{Error, Result, report::Status};

// ─── Destination logs ────────────────────────────────────────────────────────

/// Identifies one append-only status event log in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum EventLog {
  ReportAck,
  ReportProcessing,
  ReportDone,
}

impl EventLog {
  /// The status every event in this log records.
  pub fn status(self) -> Status {
    match self {
      Self::ReportAck => Status::Ack,
      Self::ReportProcessing => Status::Processing,
      Self::ReportDone => Status::Done,
    }
  }
}

// ─── Transition ──────────────────────────────────────────────────────────────

/// A requested move to one of the post-creation statuses.
///
/// `Report` is deliberately absent: it is only ever assigned at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  Ack,
  Processing,
  Done,
}

impl Transition {
  /// The log this transition is appended to.
  pub fn destination(self) -> EventLog {
    match self {
      Self::Ack => EventLog::ReportAck,
      Self::Processing => EventLog::ReportProcessing,
      Self::Done => EventLog::ReportDone,
    }
  }

  pub fn status(self) -> Status { self.destination().status() }
}

impl FromStr for Transition {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "Ack" => Ok(Self::Ack),
      "Processing" => Ok(Self::Processing),
      "Done" => Ok(Self::Done),
      other => Err(Error::InvalidStatus(other.to_owned())),
    }
  }
}

/// Validate a target status string and map it to its destination log.
///
/// Pure: never touches the store.
pub fn resolve(target: &str) -> Result<EventLog> {
  Ok(target.parse::<Transition>()?.destination())
}

// ─── Policy ──────────────────────────────────────────────────────────────────

/// Whether a transition may move a report backwards (or sideways).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
  /// Any known target is accepted whatever the current status.
  #[default]
  Unconstrained,
  /// The target must come strictly after the current status.
  ForwardOnly,
}

impl TransitionPolicy {
  pub fn allows(self, from: Status, to: Status) -> bool {
    match self {
      Self::Unconstrained => true,
      Self::ForwardOnly => to > from,
    }
  }

  pub fn check(self, from: Status, to: Status) -> Result<()> {
    if self.allows(from, to) {
      Ok(())
    } else {
      Err(Error::TransitionRejected { from, to })
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// A timestamped record of a report moving to `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
  pub report_id:    Uuid,
  pub status:       Status,
  pub comment:      String,
  pub updater:      String,
  pub updater_role: String,
  #[serde(rename = "createdAt")]
  pub created_at:   DateTime<Utc>,
}

/// Who made a transition and why; input to
/// [`crate::service::ReportService::update_status`].
#[derive(Debug, Clone, Default)]
pub struct StatusUpdate {
  pub comment:      String,
  pub updater:      String,
  pub updater_role: String,
  /// Client-supplied event time; the service clock is used when absent.
  pub created_at:   Option<DateTime<Utc>>,
}
