use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{RawResponse, Transport};
use crate::error::{CarsxeError, Result};
use crate::request::{ApiRequest, HttpMethod};

/// reqwest-backed transport. Clones share one connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CarsxeError::Transport(e.to_string()))?;
        info!(timeout_ms = timeout.as_millis() as u64, "Created CarsXE HTTP transport");
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client, e.g. one with custom proxies or TLS.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path()))]
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(request.url),
            HttpMethod::Post => {
                let builder = self
                    .client
                    .post(request.url)
                    .header("Content-Type", "application/json");
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        debug!("Sending request to CarsXE API");
        let response = builder.send().await.map_err(|e| {
            // reqwest errors embed the URL, which carries the API key
            let e = e.without_url();
            error!(error = %e, "HTTP request failed");
            CarsxeError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        debug!(status, "Received response from CarsXE API");

        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "Failed to read response body");
            CarsxeError::Transport(e.to_string())
        })?;

        Ok(RawResponse { status, body })
    }
}
