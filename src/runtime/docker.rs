use bytes::Bytes;
use http::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::container::{ContainerID, ContainerState, ContainerSummary};

use super::engine::EngineEndpoint;
use super::{ContainerRuntime, Error, InspectError, Result};

/// Environment variables a container carries when it is a managed unit.
pub const DEFAULT_UNIT_MARKERS: &[&str] = &["UNIT_APP_NAME"];

/// [`ContainerRuntime`] backed by the Docker Engine HTTP API.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    endpoint: EngineEndpoint,
    unit_markers: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedContainer {
    id: String,
    #[serde(default)]
    names: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedContainer {
    state: InspectedState,
    #[serde(default)]
    config: Option<InspectedConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedState {
    #[serde(default)]
    running: bool,
    #[serde(default)]
    restarting: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectedConfig {
    #[serde(default)]
    env: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct EngineMessage {
    message: String,
}

impl DockerRuntime {
    /// Creates a client for the engine at `endpoint`.
    ///
    /// No connection is made here; only the address is validated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `endpoint` is neither a `unix://`
    /// nor a `tcp://`/`http://` address.
    pub fn new(endpoint: &str, unit_markers: Vec<String>) -> Result<Self> {
        let endpoint: EngineEndpoint = endpoint.parse()?;
        Ok(Self {
            endpoint,
            unit_markers,
        })
    }

    pub fn endpoint(&self) -> &EngineEndpoint {
        &self.endpoint
    }

    fn is_managed(&self, env: &[String]) -> bool {
        self.unit_markers.iter().all(|marker| {
            env.iter().any(|entry| {
                entry.split_once('=').map_or(entry.as_str(), |(key, _)| key) == marker
            })
        })
    }

    async fn call(&self, method: Method, path: &str) -> Result<Bytes> {
        let (status, body) = self.endpoint.request(method, path).await?;
        if !status.is_success() {
            return Err(unexpected_status(path, status, &body));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.call(Method::GET, path).await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            path: path.to_owned(),
            source,
        })
    }
}

fn unexpected_status(path: &str, status: StatusCode, body: &[u8]) -> Error {
    let message = serde_json::from_slice::<EngineMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).trim().to_owned());
    Error::UnexpectedStatus {
        path: path.to_owned(),
        status: status.as_u16(),
        message,
    }
}

/// Converts listed containers, skipping any whose id cannot be used.
fn summaries(listed: Vec<ListedContainer>) -> Vec<ContainerSummary> {
    listed
        .into_iter()
        .filter_map(|c| match ContainerID::new(&c.id) {
            Ok(id) => Some(ContainerSummary::new(id, c.names.unwrap_or_default())),
            Err(err) => {
                log::warn!("skipping listed container: {}", err);
                None
            }
        })
        .collect()
}

impl ContainerRuntime for DockerRuntime {
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let listed: Vec<ListedContainer> = self.get_json("/containers/json?all=1").await?;
        log::trace!("engine listed {} containers", listed.len());

        Ok(summaries(listed))
    }

    async fn inspect_container(
        &self,
        id: &ContainerID,
    ) -> std::result::Result<ContainerState, InspectError> {
        let inspected: InspectedContainer =
            self.get_json(&format!("/containers/{id}/json")).await?;

        let env = inspected
            .config
            .and_then(|config| config.env)
            .unwrap_or_default();
        if !self.is_managed(&env) {
            return Err(InspectError::Unmanaged(id.clone()));
        }

        Ok(ContainerState {
            running: inspected.state.running,
            restarting: inspected.state.restarting,
        })
    }

    async fn remove_container(&self, id: &ContainerID) -> Result<()> {
        self.call(Method::DELETE, &format!("/containers/{id}?force=1"))
            .await
            .map(|_| ())
    }
}
