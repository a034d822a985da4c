//! Control plane communication.
mod error;
mod http;

pub use error::{Error, Result};
pub use http::{CONNECT_TIMEOUT, ERROR_BODY_LIMIT, HttpReporter, KEEPALIVE, REQUEST_TIMEOUT};

use crate::status::ContainerStatus;

/// The control plane's verdict on one reported unit.
///
/// The id is kept as sent. Matching it against the report happens during
/// reconciliation, so an id that is not a valid container id only affects its
/// own entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ReportResponseUnit {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Found")]
    pub found: bool,
}

impl ReportResponseUnit {
    pub fn new(id: impl Into<String>, found: bool) -> Self {
        Self {
            id: id.into(),
            found,
        }
    }
}

/// Delivers a status report and returns the control plane's answer.
pub trait ReportTransport {
    fn send_report(
        &self,
        report: &[ContainerStatus],
    ) -> impl Future<Output = Result<Vec<ReportResponseUnit>>> + Send;
}
