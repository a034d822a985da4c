use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::status::ContainerStatus;

use super::{Error, ReportResponseUnit, ReportTransport, Result};

/// Upper bound for a whole report request: connect, TLS handshake and response.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound for establishing the connection alone.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const KEEPALIVE: Duration = Duration::from_secs(30);
/// Longest part of a rejection body kept in [`Error::UnexpectedStatus`].
pub const ERROR_BODY_LIMIT: usize = 1024;

const STATUS_PATH: &str = "units/status";

/// Sends status reports to the control plane over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpReporter {
    /// Creates a reporter posting to `{endpoint}/units/status`.
    ///
    /// Trailing slashes of `endpoint` are ignored. Timeouts are fixed here and
    /// apply to every report sent through this instance.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidEndpoint`] if `endpoint` is not an absolute http(s) URL.
    /// * [`Error::Client`] if the underlying client cannot be initialized.
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self> {
        let url = format!("{}/{STATUS_PATH}", endpoint.trim_end_matches('/'));
        match reqwest::Url::parse(&url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            Ok(_) => {
                return Err(Error::InvalidEndpoint {
                    endpoint: endpoint.to_owned(),
                    reason: "expected an http or https URL",
                });
            }
            Err(_) => {
                return Err(Error::InvalidEndpoint {
                    endpoint: endpoint.to_owned(),
                    reason: "not a valid URL",
                });
            }
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .tcp_keepalive(KEEPALIVE)
            .build()
            .map_err(Error::Client)?;

        Ok(Self {
            client,
            url,
            token: token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ReportTransport for HttpReporter {
    async fn send_report(&self, report: &[ContainerStatus]) -> Result<Vec<ReportResponseUnit>> {
        let body = serde_json::to_vec(report).map_err(Error::Encode)?;
        log::debug!("sending status of {} units to {}", report.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("bearer {}", self.token))
            .body(body)
            .send()
            .await
            .map_err(|source| Error::Send {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => truncated(body.trim(), ERROR_BODY_LIMIT).to_owned(),
                Err(err) => {
                    log::debug!("failed to read rejection body from {}: {}", self.url, err);
                    String::new()
                }
            };
            return Err(Error::UnexpectedStatus {
                url: self.url.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|source| Error::Receive {
            url: self.url.clone(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

fn truncated(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
