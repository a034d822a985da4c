use std::collections::{HashMap, HashSet};

use crate::container::ContainerID;
use crate::observer::{CycleEvent, ReportObserver};
use crate::remote::ReportResponseUnit;
use crate::runtime::ContainerRuntime;
use crate::status::ContainerStatus;

/// What a reconciliation pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub removed: Vec<ContainerID>,
    pub failed: Vec<ContainerID>,
    /// Disowned ids that were not part of the report and were left alone.
    pub ignored: Vec<String>,
}

/// Force-removes every reported unit the control plane no longer knows.
///
/// Units marked as found are never touched, and neither are ids the report did
/// not contain. Each removal is attempted once per pass, failures do not stop
/// the remaining removals.
pub async fn reconcile<R, O>(
    runtime: &R,
    report: &[ContainerStatus],
    replies: &[ReportResponseUnit],
    observer: &O,
) -> Reconciliation
where
    R: ContainerRuntime,
    O: ReportObserver + ?Sized,
{
    let reported: HashMap<&str, &ContainerID> = report
        .iter()
        .map(|entry| (entry.id.as_ref(), &entry.id))
        .collect();
    let mut attempted = HashSet::with_capacity(replies.len());
    let mut outcome = Reconciliation::default();

    for reply in replies.iter().filter(|reply| !reply.found) {
        let Some(&id) = reported.get(reply.id.as_str()) else {
            observer.observe(CycleEvent::UnknownUnit { id: &reply.id });
            outcome.ignored.push(reply.id.clone());
            continue;
        };
        if !attempted.insert(id) {
            continue;
        }

        match runtime.remove_container(id).await {
            Ok(()) => {
                observer.observe(CycleEvent::Removed { id });
                outcome.removed.push(id.clone());
            }
            Err(error) => {
                observer.observe(CycleEvent::RemoveFailed { id, error: &error });
                outcome.failed.push(id.clone());
            }
        }
    }

    outcome
}
