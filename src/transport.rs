use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Response as seen by the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: u16,
    /// Response text; left empty for accepted responses
    pub body: String,
}

impl Delivery {
    pub fn is_accepted(&self) -> bool {
        is_accepted_status(self.status)
    }
}

/// The ingestion endpoint only acknowledges with 200 or 204
pub fn is_accepted_status(status: u16) -> bool {
    matches!(status, 200 | 204)
}

/// The request never produced a response
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
pub trait EventTransport: Send + Sync {
    /// POST a JSON body, optionally with a spoofed `User-Agent`
    async fn post(
        &self,
        url: &str,
        user_agent: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Delivery, TransportError>;
}

/// `reqwest`-backed transport sharing one connection pool across all workers
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(usize::MAX)
            .tcp_nodelay(true)
            .user_agent(concat!("pixel-loadgen/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        user_agent: Option<&str>,
        body: Vec<u8>,
    ) -> Result<Delivery, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(agent) = user_agent {
            request = request.header(USER_AGENT, agent);
        }

        let resp = request.send().await?;
        let status = resp.status().as_u16();

        // Reading the body hands the connection back to the pool.
        let body = if is_accepted_status(status) {
            if let Err(err) = resp.bytes().await {
                debug!(%url, error = %err, "failed to drain accepted response body");
            }
            String::new()
        } else {
            resp.text().await.unwrap_or_default()
        };

        Ok(Delivery { status, body })
    }
}
