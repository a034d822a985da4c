use std::time::Duration;

use crate::container::ContainerID;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid runtime endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: &'static str,
    },
    #[error("failed to connect to runtime at `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to runtime at `{endpoint}` timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },
    #[error("failed to build runtime request: {0}")]
    Request(#[source] http::Error),
    #[error("runtime http exchange failed: {0}")]
    Http(#[source] hyper::Error),
    #[error("runtime answered `{path}` with status {status}: {message}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        message: String,
    },
    #[error("failed to decode runtime response for `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Container(#[from] crate::container::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a fresh container inspection.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("container `{0}` is not a managed unit")]
    Unmanaged(ContainerID),
    #[error(transparent)]
    Runtime(#[from] Error),
}
