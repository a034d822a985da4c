//! Reporting of cycle events.
//!
//! Nothing in a report cycle returns an error to a caller; everything that
//! goes wrong is surfaced as a [`CycleEvent`] to a [`ReportObserver`].
use crate::container::ContainerID;
use crate::{remote, runtime};

#[derive(Debug)]
pub enum CycleEvent<'a> {
    /// Listing containers failed; the cycle was abandoned.
    ListFailed { error: &'a runtime::Error },
    /// Inspecting a container failed; it is reported with an error status.
    InspectFailed {
        id: &'a ContainerID,
        error: &'a runtime::Error,
    },
    /// No managed unit exists, nothing was sent.
    NothingToReport,
    /// Sending the report failed; the cycle was abandoned before reconciliation.
    ReportFailed { error: &'a remote::Error },
    /// The control plane answered a report.
    Reported { units: usize, replies: usize },
    /// The control plane answered for a unit that was not part of the report.
    UnknownUnit { id: &'a str },
    /// A unit disowned by the control plane was removed.
    Removed { id: &'a ContainerID },
    /// Removing a disowned unit failed.
    RemoveFailed {
        id: &'a ContainerID,
        error: &'a runtime::Error,
    },
}

pub trait ReportObserver: Send + Sync {
    fn observe(&self, event: CycleEvent<'_>);
}

/// Forwards cycle events to the [`log`] facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl ReportObserver for LogObserver {
    fn observe(&self, event: CycleEvent<'_>) {
        match event {
            CycleEvent::ListFailed { error } => {
                log::error!("failed to list containers: {}", error)
            }
            CycleEvent::InspectFailed { id, error } => {
                log::error!("failed to inspect container `{}`: {}", id, error)
            }
            CycleEvent::NothingToReport => log::debug!("no managed units, skipping report"),
            CycleEvent::ReportFailed { error } => {
                log::error!("failed to send status report: {}", error)
            }
            CycleEvent::Reported { units, replies } => {
                log::debug!("reported {} units, got {} replies", units, replies)
            }
            CycleEvent::UnknownUnit { id } => {
                log::warn!("ignoring reply for unreported unit `{:?}`", id)
            }
            CycleEvent::Removed { id } => log::info!("removed disowned container `{}`", id),
            CycleEvent::RemoveFailed { id, error } => {
                log::error!("failed to remove container `{}`: {}", id, error)
            }
        }
    }
}

impl<O: ReportObserver + ?Sized> ReportObserver for std::sync::Arc<O> {
    fn observe(&self, event: CycleEvent<'_>) {
        (**self).observe(event)
    }
}
