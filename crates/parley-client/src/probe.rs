//! Liveness requests.

use parley_core::StatusSnapshot;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;

/// Fetches the server's current status.
pub trait StatusProbe: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<StatusSnapshot, ProbeError>> + Send;
}

/// `GET /status` over HTTP. No request timeout is applied.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusProbe for HttpProbe {
    async fn fetch(&self) -> Result<StatusSnapshot, ProbeError> {
        let response = self
            .client
            .get(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// A failed liveness request.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(u16),
    #[error("unreadable status body: {0}")]
    Decode(#[from] serde_json::Error),
}
