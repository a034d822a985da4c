/// Errors that prevent the reporter from starting.
///
/// Once running, the reporter never fails; cycle errors are only observed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] crate::config::Error),
    #[error("failed to set up container runtime client: {0}")]
    Runtime(#[from] crate::runtime::Error),
    #[error("failed to set up control plane client: {0}")]
    Remote(#[from] crate::remote::Error),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
