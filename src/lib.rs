//! Unit Reporter: keeps a control plane's view of the units on a host in sync
//! with the container engine.
//!
//! At a fixed interval the reporter lists every container, derives a status for
//! each managed unit, posts the report to the control plane and force-removes
//! the units the control plane no longer knows about.

pub mod config;
pub mod container;
pub mod error;
pub mod observer;
pub mod reconcile;
pub mod remote;
pub mod reporter;
pub mod runtime;
pub mod status;

#[cfg(test)]
mod testing;

pub use config::ReporterConfig;
pub use reporter::{Reporter, ReporterState};

/// Runs the reporter until the process is asked to terminate.
///
/// Reads the configuration from the environment, starts a [`Reporter`] against
/// the Docker engine and the control plane, and stops it on SIGINT or SIGTERM.
///
/// # Errors
///
/// Possible errors include:
/// - Missing or invalid environment variables (e.g., `REMOTE_ENDPOINT`).
/// - A malformed runtime or control plane endpoint.
/// - Failure to install the signal handlers.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ReporterConfig::from_env()?;
    log::info!(
        "reporting units from {} to {} every {:?}",
        config.runtime_endpoint,
        config.remote_endpoint,
        config.interval
    );

    let reporter = Reporter::from_config(config)?;
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .map_err(error::Error::Signal)?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(error::Error::Signal)?;
            log::info!("received SIGINT, stopping");
        }
        _ = terminate.recv() => log::info!("received SIGTERM, stopping"),
        _ = reporter.wait() => {
            log::warn!("status reporter exited on its own");
            return Ok(());
        }
    }

    reporter.stop().await;
    Ok(())
}
