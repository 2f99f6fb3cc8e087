//! services/api/src/adapters/endpoint_client.rs
//!
//! The client side of `POST /api/generate-quote`.
//! It implements the `QuoteEndpoint` port from the `core` crate.

use async_trait::async_trait;
use quoteflow_core::domain::Quote;
use quoteflow_core::ports::{PortError, PortResult, QuoteEndpoint};
use serde::Serialize;

#[derive(Serialize)]
struct GenerateQuoteBody<'a> {
    category: &'a str,
}

/// Calls a running QuoteFlow server over HTTP.
#[derive(Clone)]
pub struct HttpQuoteEndpoint {
    client: reqwest::Client,
    base_url: String,
}

impl HttpQuoteEndpoint {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl QuoteEndpoint for HttpQuoteEndpoint {
    async fn generate_quote(&self, category_id: &str) -> PortResult<Quote> {
        let response = self
            .client
            .post(format!("{}/api/generate-quote", self.base_url))
            .json(&GenerateQuoteBody {
                category: category_id,
            })
            .send()
            .await
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Upstream(format!(
                "quote endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<Quote>()
            .await
            .map_err(|e| PortError::Malformed(e.to_string()))
    }
}
