use reqwest::Client;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::domain::{RequestData, ResponseData};
use crate::error::{ExecutionError, ExecutionResult};

use super::request::build_outbound;
use super::response::build_response;

/// Sends [`RequestData`] over HTTP and normalizes the result.
///
/// Every call builds its own client, so executions share nothing and may run
/// in parallel. The response body is read fully into memory with no size cap.
#[derive(Debug, Clone)]
pub struct Executor {
    timeout: Duration,
}

impl Executor {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.request_timeout())
    }

    /// Executes once. The timeout covers connect, send and the full body
    /// read; there is no retry and no partial response on failure.
    ///
    /// Once the status line and headers have arrived, any failure (the
    /// timeout included) is a [`ExecutionError::BodyReadFailure`].
    #[tracing::instrument(skip_all, fields(request_id = %request.id, method = %request.method))]
    pub async fn execute(&self, request: &RequestData) -> ExecutionResult<ResponseData> {
        let outbound = build_outbound(request)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|source| ExecutionError::NetworkFailure { source })?;

        let mut builder = client
            .request(outbound.method, outbound.url.clone())
            .headers(outbound.headers);
        if let Some(body) = outbound.body {
            builder = builder.body(body);
        }

        tracing::debug!(url = %outbound.url, "dispatching request");
        let started = Instant::now();

        let response = builder
            .send()
            .await
            .map_err(|source| ExecutionError::NetworkFailure { source })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ExecutionError::BodyReadFailure { source })?;
        let elapsed = started.elapsed();

        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            size = bytes.len(),
            "response received"
        );

        Ok(build_response(status, &headers, &bytes, elapsed))
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
