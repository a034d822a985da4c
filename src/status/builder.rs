use crate::container::ContainerSummary;
use crate::observer::{CycleEvent, ReportObserver};
use crate::runtime::{ContainerRuntime, InspectError};

use super::{ContainerStatus, derive_status};

/// Builds the status report for the given containers.
///
/// Every container is inspected fresh, one after another. Containers that are
/// not managed units are skipped. An inspection failure is handed to the
/// observer and the container is reported with [`Status::Error`]; it never
/// stops the remaining containers from being reported.
///
/// Entries keep the order of `containers`.
///
/// [`Status::Error`]: super::Status::Error
pub async fn build_report<R, O>(
    runtime: &R,
    containers: &[ContainerSummary],
    observer: &O,
) -> Vec<ContainerStatus>
where
    R: ContainerRuntime,
    O: ReportObserver + ?Sized,
{
    let mut report = Vec::with_capacity(containers.len());
    for container in containers {
        let inspection = runtime.inspect_container(&container.id).await;
        if let Err(InspectError::Runtime(error)) = &inspection {
            observer.observe(CycleEvent::InspectFailed {
                id: &container.id,
                error,
            });
        }

        let Some(status) = derive_status(&inspection) else {
            log::trace!("skipping unmanaged container {}", container.id);
            continue;
        };
        report.push(ContainerStatus {
            id: container.id.clone(),
            name: container.display_name().to_owned(),
            status,
        });
    }

    report
}
