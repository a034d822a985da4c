use std::time::Duration;

use tokio::sync::watch;

use crate::config::ReporterConfig;
use crate::observer::{CycleEvent, LogObserver, ReportObserver};
use crate::reconcile::{Reconciliation, reconcile};
use crate::remote::{HttpReporter, ReportTransport};
use crate::runtime::{ContainerRuntime, DockerRuntime};
use crate::status::build_report;

/// Lifecycle of a [`Reporter`]'s background loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReporterState {
    /// The loop is scheduled or between cycles. A started reporter is in this
    /// state before [`Reporter::start`] returns.
    Running,
    /// The loop has exited. Terminal.
    Stopped,
}

/// Periodically reports unit status to the control plane and removes units it
/// disowns.
///
/// Each reporter owns exactly one background task. A cycle runs every
/// [`ReporterConfig::interval`], counted from the end of the previous cycle.
/// Dropping the reporter aborts the loop like [`Reporter::stop`] does, without
/// waiting for it.
#[derive(Debug)]
pub struct Reporter {
    abort: watch::Sender<bool>,
    state: watch::Receiver<ReporterState>,
}

impl Reporter {
    /// Starts a reporter talking to the Docker engine and the control plane
    /// named in `config`.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Fails if the runtime endpoint is malformed or the HTTP client cannot be
    /// built. Nothing is spawned in that case.
    pub fn from_config(config: ReporterConfig) -> crate::error::Result<Self> {
        let runtime = DockerRuntime::new(&config.runtime_endpoint, config.unit_markers.clone())?;
        let transport = HttpReporter::new(&config.remote_endpoint, config.remote_token.clone())?;
        Ok(Self::start(config, runtime, transport))
    }

    /// Starts a reporter that logs cycle events through [`LogObserver`].
    pub fn start<R, T>(config: ReporterConfig, runtime: R, transport: T) -> Self
    where
        R: ContainerRuntime + Send + Sync + 'static,
        T: ReportTransport + Send + Sync + 'static,
    {
        Self::start_with_observer(config, runtime, transport, LogObserver)
    }

    pub fn start_with_observer<R, T, O>(
        config: ReporterConfig,
        runtime: R,
        transport: T,
        observer: O,
    ) -> Self
    where
        R: ContainerRuntime + Send + Sync + 'static,
        T: ReportTransport + Send + Sync + 'static,
        O: ReportObserver + 'static,
    {
        let (abort, abort_rx) = watch::channel(false);
        let (state_tx, state) = watch::channel(ReporterState::Running);
        let cycle = Cycle {
            runtime,
            transport,
            observer,
        };
        tokio::spawn(run_loop(config.interval, cycle, abort_rx, state_tx));

        Self { abort, state }
    }

    /// Stops the loop and waits until it has exited.
    ///
    /// A cycle that is already running is completed first. Calling this again,
    /// or after the loop exited on its own, only waits for the stopped state
    /// and returns right away.
    pub async fn stop(&self) {
        self.abort.send_replace(true);
        self.wait().await;
    }

    /// Waits until the loop has exited, without asking it to.
    pub async fn wait(&self) {
        let mut state = self.state.clone();
        // An error means the loop is gone, which is what we wait for anyway.
        let _ = state.wait_for(|s| *s == ReporterState::Stopped).await;
    }

    pub fn state(&self) -> ReporterState {
        *self.state.borrow()
    }
}

/// Publishes [`ReporterState::Stopped`] however the loop ends, panics included.
struct StoppedOnDrop(watch::Sender<ReporterState>);

impl Drop for StoppedOnDrop {
    fn drop(&mut self) {
        self.0.send_replace(ReporterState::Stopped);
    }
}

async fn run_loop<R, T, O>(
    interval: Duration,
    cycle: Cycle<R, T, O>,
    mut abort: watch::Receiver<bool>,
    state: watch::Sender<ReporterState>,
) where
    R: ContainerRuntime,
    T: ReportTransport,
    O: ReportObserver,
{
    let _stopped = StoppedOnDrop(state);
    log::debug!("status reporter running every {:?}", interval);

    loop {
        tokio::select! {
            biased;
            _ = aborted(&mut abort) => break,
            _ = tokio::time::sleep(interval) => {
                log::trace!("starting report cycle");
                let outcome = cycle.run().await;
                log::trace!("report cycle finished: {:?}", outcome);
            }
        }
    }

    log::debug!("status reporter stopped");
}

/// Resolves once a stop is requested or the [`Reporter`] is dropped.
async fn aborted(abort: &mut watch::Receiver<bool>) {
    // The returned guard is not Send and must not outlive this call.
    let _ = abort.wait_for(|aborted| *aborted).await;
}

/// How a single cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CycleOutcome {
    ListFailed,
    NothingToReport,
    ReportFailed,
    Reconciled(Reconciliation),
}

/// One inspect, report and reconcile pass.
pub(crate) struct Cycle<R, T, O> {
    runtime: R,
    transport: T,
    observer: O,
}

impl<R, T, O> Cycle<R, T, O>
where
    R: ContainerRuntime,
    T: ReportTransport,
    O: ReportObserver,
{
    pub(crate) async fn run(&self) -> CycleOutcome {
        let containers = match self.runtime.list_containers().await {
            Ok(containers) => containers,
            Err(error) => {
                self.observer.observe(CycleEvent::ListFailed { error: &error });
                return CycleOutcome::ListFailed;
            }
        };

        let report = build_report(&self.runtime, &containers, &self.observer).await;
        if report.is_empty() {
            self.observer.observe(CycleEvent::NothingToReport);
            return CycleOutcome::NothingToReport;
        }

        let replies = match self.transport.send_report(&report).await {
            Ok(replies) => replies,
            Err(error) => {
                self.observer.observe(CycleEvent::ReportFailed { error: &error });
                return CycleOutcome::ReportFailed;
            }
        };
        self.observer.observe(CycleEvent::Reported {
            units: report.len(),
            replies: replies.len(),
        });

        CycleOutcome::Reconciled(reconcile(&self.runtime, &report, &replies, &self.observer).await)
    }
}
