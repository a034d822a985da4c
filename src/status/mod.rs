//! Status derivation and report building.
mod builder;

pub use builder::build_report;

use std::fmt;

use crate::container::{ContainerID, ContainerState};
use crate::runtime::InspectError;

/// Lifecycle status of a unit as understood by the control plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Started,
    Stopped,
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Started => "started",
            Self::Stopped => "stopped",
            Self::Error => "error",
        })
    }
}

/// One entry of a status report.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContainerStatus {
    #[serde(rename = "ID")]
    pub id: ContainerID,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Status")]
    pub status: Status,
}

/// Maps a fresh inspection result to the status to report.
///
/// Returns `None` for containers that are not managed units; those are left
/// out of the report entirely. A restart loop counts as an error even when the
/// engine also flags the container as running.
pub fn derive_status(inspection: &Result<ContainerState, InspectError>) -> Option<Status> {
    match inspection {
        Err(InspectError::Unmanaged(_)) => None,
        Err(InspectError::Runtime(_)) => Some(Status::Error),
        Ok(state) if state.restarting => Some(Status::Error),
        Ok(state) if state.running => Some(Status::Started),
        Ok(_) => Some(Status::Stopped),
    }
}
