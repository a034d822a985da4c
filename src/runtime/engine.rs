use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use http::{Method, Request, StatusCode, header};
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1::SendRequest;
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};

use super::{Error, Result};

/// Upper bound for establishing a connection.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for a whole request, connection included.
pub const FULL_TIMEOUT: Duration = Duration::from_secs(60);

/// Address of the engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEndpoint {
    /// `unix:///var/run/docker.sock`
    Unix(PathBuf),
    /// `tcp://host:port` or `http://host:port`
    Tcp(String),
}

impl FromStr for EngineEndpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidEndpoint {
            endpoint: s.to_owned(),
            reason,
        };

        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(invalid("missing socket path"));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }

        let addr = s
            .strip_prefix("tcp://")
            .or_else(|| s.strip_prefix("http://"))
            .ok_or_else(|| invalid("expected a unix://, tcp:// or http:// address"))?
            .trim_end_matches('/');
        if addr.is_empty() || addr.contains('/') {
            return Err(invalid("expected host:port"));
        }

        Ok(Self::Tcp(addr.to_owned()))
    }
}

impl fmt::Display for EngineEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
        }
    }
}

impl EngineEndpoint {
    /// Sends a body-less request and returns the status together with the full body.
    ///
    /// Every call uses a fresh connection. The whole exchange is bounded by
    /// [`FULL_TIMEOUT`], the connect phase additionally by [`DIAL_TIMEOUT`].
    pub(super) async fn request(&self, method: Method, path: &str) -> Result<(StatusCode, Bytes)> {
        tokio::time::timeout(FULL_TIMEOUT, self.exchange(method, path))
            .await
            .map_err(|_| Error::Timeout {
                endpoint: self.to_string(),
                after: FULL_TIMEOUT,
            })?
    }

    async fn exchange(&self, method: Method, path: &str) -> Result<(StatusCode, Bytes)> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::HOST, self.host())
            .body(Empty::<Bytes>::new())
            .map_err(Error::Request)?;

        let mut sender = match self {
            Self::Unix(socket) => {
                let stream = self.dial(tokio::net::UnixStream::connect(socket)).await?;
                handshake(stream).await?
            }
            Self::Tcp(addr) => {
                let stream = self
                    .dial(tokio::net::TcpStream::connect(addr.as_str()))
                    .await?;
                handshake(stream).await?
            }
        };
        log::trace!("{} {} {}", self, request.method(), request.uri());

        let response = sender.send_request(request).await.map_err(Error::Http)?;
        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(Error::Http)?
            .to_bytes();

        Ok((status, body))
    }

    async fn dial<S>(&self, connect: impl Future<Output = std::io::Result<S>>) -> Result<S> {
        match tokio::time::timeout(DIAL_TIMEOUT, connect).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(Error::Connect {
                endpoint: self.to_string(),
                source,
            }),
            Err(_) => Err(Error::Timeout {
                endpoint: self.to_string(),
                after: DIAL_TIMEOUT,
            }),
        }
    }

    fn host(&self) -> &str {
        match self {
            // The engine ignores the host on a local socket but HTTP/1.1 requires one.
            Self::Unix(_) => "docker",
            Self::Tcp(addr) => addr,
        }
    }
}

async fn handshake<S>(stream: S) -> Result<SendRequest<Empty<Bytes>>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(Error::Http)?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            log::debug!("runtime connection closed with error: {}", err);
        }
    });

    Ok(sender)
}
