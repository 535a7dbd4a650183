//! Layer that forwards envelopes to another service.
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use meshblu_data_core::Envelope;

use super::Layer;
use crate::{query::DataQuery, Error, Result};

/// Layer that posts each envelope as JSON to an endpoint.
pub struct ForwardLayer {
    client: Client,
    url: Url,
    retry_limit: u64,
    backoff_millis: u64,
}

impl ForwardLayer {
    pub fn new(url: Url, retry_limit: u64, backoff_millis: u64) -> Self {
        Self {
            client: Client::new(),
            url,
            retry_limit: retry_limit.max(1),
            backoff_millis,
        }
    }

    async fn request(&self, envelope: &Envelope) -> Result<bool> {
        let response = self
            .client
            .post(self.url.clone())
            .json(envelope)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// Delay before the next attempt, saturating at the maximum.
fn next_backoff(millis: u64) -> u64 {
    millis.saturating_mul(2)
}

#[async_trait]
impl Layer for ForwardLayer {
    fn name(&self) -> &'static str {
        "forward"
    }

    async fn save(&self, envelope: &Envelope) -> Result<()> {
        let mut backoff_millis = self.backoff_millis;
        for attempt in 1..=self.retry_limit {
            match self.request(envelope).await {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    tracing::warn!(url = %self.url, attempt, "forward rejected")
                }
                Err(e) => {
                    tracing::warn!(url = %self.url, attempt, "forward request failure: {}", e)
                }
            }
            if attempt < self.retry_limit {
                tokio::time::sleep(Duration::from_millis(backoff_millis)).await;
                backoff_millis = next_backoff(backoff_millis);
            }
        }
        Err(Error::ForwardFailed(self.url.clone(), self.retry_limit))
    }

    async fn list(&self, _query: &DataQuery) -> Result<Vec<Envelope>> {
        Err(Error::ListingUnsupported(self.name()))
    }
}
