//! HTTP event collector writer.
//!
//! Delivery goes through a *named* collector input that an administrator
//! provisioned on the host. Construction resolves that input through the
//! management API and is the only step that can observe the "unavailable"
//! condition (missing input, or a credential without permission) which the
//! engine answers with the classic fallback. Once constructed, deliveries
//! are retried per [`RetryPolicy`] before a failure is surfaced.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use super::{Event, EventWriteError, EventWriter, RetryPolicy};

/// Collector input description returned by the management API.
#[derive(Deserialize)]
struct CollectorInput {
    token: String,
    #[serde(default = "default_collector_port")]
    port: u16,
}

fn default_collector_port() -> u16 {
    8088
}

/// Event writer posting JSON envelopes to the HTTP event collector.
pub struct HecEventWriter {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    retry: RetryPolicy,
    closed: AtomicBool,
}

impl HecEventWriter {
    /// Resolves the collector input `name` on `scheme://host:port` and
    /// builds a writer for its token.
    ///
    /// A 401/403/404 answer from the management API yields
    /// [`EventWriteError::Unavailable`]; every other failure (transport
    /// errors included) propagates as-is and is *not* treated as a
    /// fallback trigger.
    pub async fn create(
        name: &str,
        session_key: &str,
        scheme: &str,
        host: &str,
        port: u16,
    ) -> Result<Self, EventWriteError> {
        let client = reqwest::Client::builder().build()?;
        let url = format!("{scheme}://{host}:{port}/services/data/inputs/http/{name}");
        let resp = client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {session_key}"))
            .send()
            .await?;

        let status = resp.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            return Err(EventWriteError::Unavailable {
                name: name.to_string(),
                status,
            });
        }
        if !status.is_success() {
            return Err(EventWriteError::Status { status });
        }

        let input: CollectorInput = resp.json().await?;
        Ok(Self {
            client,
            endpoint: format!("{scheme}://{host}:{}/services/collector", input.port),
            token: input.token,
            retry: RetryPolicy::default(),
            closed: AtomicBool::new(false),
        })
    }

    /// Replaces the delivery retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn post_once(&self, envelope: &Value) -> Result<(), EventWriteError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(envelope)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EventWriteError::Status { status })
        }
    }
}

#[async_trait]
impl EventWriter for HecEventWriter {
    fn name(&self) -> &'static str {
        "hec"
    }

    async fn write(&self, event: Event) -> Result<(), EventWriteError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EventWriteError::Closed);
        }

        let envelope = event.to_hec_json();
        let mut attempt: u32 = 0;
        loop {
            match self.post_once(&envelope).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.retry.retries => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        "collector delivery failed, retrying"
                    );
                    tokio::time::sleep(self.retry.delay(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
