#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid remote endpoint `{endpoint}`: {reason}")]
    InvalidEndpoint {
        endpoint: String,
        reason: &'static str,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to encode status report: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to send status report to `{url}`: {source}")]
    Send {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("remote `{url}` answered with status {status}: {body}")]
    UnexpectedStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to read response from `{url}`: {source}")]
    Receive {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode response from `{url}`: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
