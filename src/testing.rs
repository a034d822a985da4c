//! In-memory collaborators for exercising report cycles.
use std::sync::{Arc, Mutex};

use crate::container::{ContainerID, ContainerState, ContainerSummary};
use crate::observer::{CycleEvent, ReportObserver};
use crate::remote::{self, ReportResponseUnit, ReportTransport};
use crate::runtime::{self, ContainerRuntime, InspectError};
use crate::status::ContainerStatus;

pub(crate) fn id(raw: &str) -> ContainerID {
    ContainerID::new(raw).unwrap()
}

fn runtime_failure(path: String) -> runtime::Error {
    runtime::Error::UnexpectedStatus {
        path,
        status: 500,
        message: "fake failure".to_owned(),
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FakeContainer {
    id: ContainerID,
    names: Vec<String>,
    state: ContainerState,
    managed: bool,
    inspect_fails: bool,
    remove_fails: bool,
}

impl FakeContainer {
    fn new(raw_id: &str, name: &str, running: bool, restarting: bool) -> Self {
        Self {
            id: id(raw_id),
            names: vec![name.to_owned()],
            state: ContainerState {
                running,
                restarting,
            },
            managed: true,
            inspect_fails: false,
            remove_fails: false,
        }
    }

    pub(crate) fn running(raw_id: &str, name: &str) -> Self {
        Self::new(raw_id, name, true, false)
    }

    pub(crate) fn restarting(raw_id: &str, name: &str) -> Self {
        Self::new(raw_id, name, true, true)
    }

    pub(crate) fn stopped(raw_id: &str, name: &str) -> Self {
        Self::new(raw_id, name, false, false)
    }

    pub(crate) fn unmanaged(mut self) -> Self {
        self.managed = false;
        self
    }

    pub(crate) fn without_names(mut self) -> Self {
        self.names.clear();
        self
    }

    pub(crate) fn failing_inspection(mut self) -> Self {
        self.inspect_fails = true;
        self
    }

    pub(crate) fn failing_removal(mut self) -> Self {
        self.remove_fails = true;
        self
    }
}

#[derive(Debug, Default)]
struct RuntimeState {
    containers: Vec<FakeContainer>,
    removed: Vec<ContainerID>,
    list_calls: usize,
    list_fails: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeRuntime {
    state: Arc<Mutex<RuntimeState>>,
}

impl FakeRuntime {
    pub(crate) fn new(containers: Vec<FakeContainer>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RuntimeState {
                containers,
                ..Default::default()
            })),
        }
    }

    pub(crate) fn failing_list(self) -> Self {
        self.state.lock().unwrap().list_fails = true;
        self
    }

    pub(crate) fn summaries(&self) -> Vec<ContainerSummary> {
        self.state
            .lock()
            .unwrap()
            .containers
            .iter()
            .map(|c| ContainerSummary::new(c.id.clone(), c.names.clone()))
            .collect()
    }

    pub(crate) fn removed(&self) -> Vec<ContainerID> {
        self.state.lock().unwrap().removed.clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }
}

impl ContainerRuntime for FakeRuntime {
    async fn list_containers(&self) -> runtime::Result<Vec<ContainerSummary>> {
        let fails = {
            let mut state = self.state.lock().unwrap();
            state.list_calls += 1;
            state.list_fails
        };
        if fails {
            return Err(runtime_failure("/containers/json".to_owned()));
        }
        Ok(self.summaries())
    }

    async fn inspect_container(&self, id: &ContainerID) -> Result<ContainerState, InspectError> {
        let state = self.state.lock().unwrap();
        let container = state
            .containers
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| runtime_failure(format!("/containers/{id}/json")))?;
        if container.inspect_fails {
            return Err(runtime_failure(format!("/containers/{id}/json")).into());
        }
        if !container.managed {
            return Err(InspectError::Unmanaged(id.clone()));
        }
        Ok(container.state)
    }

    async fn remove_container(&self, id: &ContainerID) -> runtime::Result<()> {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.containers.iter().position(|c| &c.id == id) else {
            return Err(runtime_failure(format!("/containers/{id}")));
        };
        if state.containers[pos].remove_fails {
            return Err(runtime_failure(format!("/containers/{id}")));
        }
        state.containers.remove(pos);
        state.removed.push(id.clone());
        Ok(())
    }
}

type Responder = dyn Fn(&[ContainerStatus]) -> Vec<ReportResponseUnit> + Send + Sync;

#[derive(Default)]
struct TransportState {
    payloads: Vec<String>,
    failures_left: usize,
}

/// Answers reports with a fixed rule and records every payload it was given.
#[derive(Clone)]
pub(crate) struct FakeTransport {
    responder: Arc<Responder>,
    state: Arc<Mutex<TransportState>>,
}

impl FakeTransport {
    pub(crate) fn answering(
        responder: impl Fn(&[ContainerStatus]) -> Vec<ReportResponseUnit> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            state: Arc::default(),
        }
    }

    /// Claims every reported unit.
    pub(crate) fn all_found() -> Self {
        Self::answering(|report| {
            report
                .iter()
                .map(|entry| ReportResponseUnit::new(entry.id.to_string(), true))
                .collect()
        })
    }

    /// Disowns the given ids and claims everything else.
    pub(crate) fn disowning(ids: &[&str]) -> Self {
        let disowned: Vec<ContainerID> = ids.iter().map(|raw| id(raw)).collect();
        Self::answering(move |report| {
            report
                .iter()
                .map(|entry| ReportResponseUnit::new(entry.id.to_string(), !disowned.contains(&entry.id)))
                .collect()
        })
    }

    pub(crate) fn failing_first(self, n: usize) -> Self {
        self.state.lock().unwrap().failures_left = n;
        self
    }

    pub(crate) fn payloads(&self) -> Vec<String> {
        self.state.lock().unwrap().payloads.clone()
    }
}

impl ReportTransport for FakeTransport {
    async fn send_report(&self, report: &[ContainerStatus]) -> remote::Result<Vec<ReportResponseUnit>> {
        let mut state = self.state.lock().unwrap();
        state
            .payloads
            .push(serde_json::to_string(report).map_err(remote::Error::Encode)?);
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(remote::Error::UnexpectedStatus {
                url: "http://control.invalid/units/status".to_owned(),
                status: 503,
                body: "unavailable".to_owned(),
            });
        }
        Ok((self.responder)(report))
    }
}

/// Records cycle events as short strings such as `removed b`.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ReportObserver for RecordingObserver {
    fn observe(&self, event: CycleEvent<'_>) {
        let line = match event {
            CycleEvent::ListFailed { .. } => "list_failed".to_owned(),
            CycleEvent::InspectFailed { id, .. } => format!("inspect_failed {id}"),
            CycleEvent::NothingToReport => "nothing_to_report".to_owned(),
            CycleEvent::ReportFailed { .. } => "report_failed".to_owned(),
            CycleEvent::Reported { units, replies } => format!("reported {units} {replies}"),
            CycleEvent::UnknownUnit { id } => format!("unknown_unit {id}"),
            CycleEvent::Removed { id } => format!("removed {id}"),
            CycleEvent::RemoveFailed { id, .. } => format!("remove_failed {id}"),
        };
        self.events.lock().unwrap().push(line);
    }
}
