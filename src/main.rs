/// Entry point for the unit status reporter.
///
/// Reads its configuration from the environment, reports the status of every
/// managed unit on this host to the control plane at a fixed interval and runs
/// until it receives SIGINT or SIGTERM.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the runtime and control
/// plane clients cannot be set up.
///
/// # Examples
///
/// ```bash
/// REMOTE_ENDPOINT=https://control.example.com REMOTE_TOKEN=secret cargo run
/// ```
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    unit_reporter::run().await
}
