//! Container runtime access.
//!
//! The reporter only needs three things from the engine: list every container,
//! inspect one container without caching, and force-remove one container.
mod docker;
mod engine;
mod error;

pub use docker::{DEFAULT_UNIT_MARKERS, DockerRuntime};
pub use engine::{DIAL_TIMEOUT, EngineEndpoint, FULL_TIMEOUT};
pub use error::{Error, InspectError, Result};

use crate::container::{ContainerID, ContainerState, ContainerSummary};

pub trait ContainerRuntime {
    /// Lists all containers known to the engine, including stopped ones.
    fn list_containers(&self) -> impl Future<Output = Result<Vec<ContainerSummary>>> + Send;

    /// Inspects a single container, bypassing any cache.
    ///
    /// Returns [`InspectError::Unmanaged`] for containers that do not carry the
    /// environment markers of a managed unit.
    fn inspect_container(
        &self,
        id: &ContainerID,
    ) -> impl Future<Output = std::result::Result<ContainerState, InspectError>> + Send;

    /// Removes a container, killing it first if it is still running.
    fn remove_container(&self, id: &ContainerID) -> impl Future<Output = Result<()>> + Send;
}
