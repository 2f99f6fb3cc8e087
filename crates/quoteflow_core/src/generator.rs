//! crates/quoteflow_core/src/generator.rs
//!
//! Orchestrates one "generate" action: pick a category, ask the quote endpoint,
//! and record the result in the quotes store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::domain::{Category, Quote};
use crate::ports::{PortError, QuoteEndpoint};
use crate::store::QuotesStore;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Another generation from this generator has not finished yet.
    #[error("A quote is already being generated")]
    Busy,
    /// The generator was shut down while the request was outstanding.
    #[error("Generation cancelled")]
    Cancelled,
    #[error("Failed to generate quote: {0}")]
    Endpoint(#[from] PortError),
}

pub struct QuoteGenerator {
    endpoint: Arc<dyn QuoteEndpoint>,
    store: Arc<Mutex<QuotesStore>>,
    in_flight: AtomicBool,
    shutdown: CancellationToken,
}

/// Clears the in-flight flag however `generate` exits.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl QuoteGenerator {
    pub fn new(endpoint: Arc<dyn QuoteEndpoint>, store: Arc<Mutex<QuotesStore>>) -> Self {
        Self {
            endpoint,
            store,
            in_flight: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<Mutex<QuotesStore>> {
        &self.store
    }

    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Stops accepting results. Responses that arrive afterwards are dropped.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Generates a quote for `category`, or for a random catalog category.
    ///
    /// On success the quote becomes the current quote and today's count goes up
    /// by one. On failure the store is left exactly as it was.
    pub async fn generate(&self, category: Option<&str>) -> Result<Quote, GenerateError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GenerateError::Busy);
        }
        let _guard = InFlight(&self.in_flight);

        if self.shutdown.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }

        let category_id = match category {
            Some(id) => id.to_string(),
            None => random_category().id,
        };
        info!(category = %category_id, "Generating quote.");

        let quote = tokio::select! {
            _ = self.shutdown.cancelled() => {
                info!(category = %category_id, "Generator shut down, discarding pending quote.");
                return Err(GenerateError::Cancelled);
            }
            result = self.endpoint.generate_quote(&category_id) => result.map_err(|e| {
                error!(category = %category_id, error = %e, "Quote generation failed.");
                GenerateError::from(e)
            })?,
        };

        let mut store = self.store.lock().await;
        if self.shutdown.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        store.set_current_quote(Some(quote.clone()));
        store.increment_generated_count().await;

        Ok(quote)
    }
}

/// Picks one of the catalog categories uniformly at random.
pub fn random_category() -> Category {
    let mut categories = Category::all();
    let index = rand::rng().random_range(0..categories.len());
    categories.swap_remove(index)
}
