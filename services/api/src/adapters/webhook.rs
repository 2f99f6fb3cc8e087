//! services/api/src/adapters/webhook.rs
//!
//! This module contains the adapter for the upstream quote webhook.
//! It implements the `QuoteSource` port from the `core` crate.

use async_trait::async_trait;
use quoteflow_core::ports::{PortError, PortResult, QuoteSource};
use serde::Serialize;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// The body the webhook expects for every request.
#[derive(Serialize)]
struct WebhookRequest<'a> {
    category: &'a str,
    role: &'a str,
}

/// An adapter that implements `QuoteSource` by POSTing to a fixed webhook URL.
///
/// One call per request: no retry, no idempotency key, transport-default timeout.
#[derive(Clone)]
pub struct WebhookQuoteSource {
    client: reqwest::Client,
    url: String,
}

impl WebhookQuoteSource {
    /// Creates a new `WebhookQuoteSource`.
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

//=========================================================================================
// `QuoteSource` Trait Implementation
//=========================================================================================

#[async_trait]
impl QuoteSource for WebhookQuoteSource {
    async fn fetch_raw(&self, category_id: &str) -> PortResult<serde_json::Value> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookRequest {
                category: category_id,
                role: "user",
            })
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Upstream(format!(
                "webhook returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))
    }
}
