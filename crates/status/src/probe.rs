//! Health endpoint client.

use async_trait::async_trait;

use crate::config::DEFAULT_HEALTH_ENDPOINT;
use crate::error::ProbeError;

/// Whatever JSON the health endpoint returns. Parsed, never inspected.
pub type HealthResponse = serde_json::Value;

/// Performs one health check against the backend.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self) -> Result<HealthResponse, ProbeError>;
}

/// Issues `GET <endpoint>` and parses the body as JSON.
///
/// The response status code is not inspected: a 500 with a JSON body
/// counts as a successful check. No timeout or retry is applied.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpHealthProbe {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for HttpHealthProbe {
    fn default() -> Self {
        Self::new(DEFAULT_HEALTH_ENDPOINT)
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    #[tracing::instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn check(&self) -> Result<HealthResponse, ProbeError> {
        metrics::counter!("status_probe_requests_total").increment(1);

        let response = self.client.get(&self.endpoint).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "health endpoint answered");

        Ok(serde_json::from_slice(&body)?)
    }
}
