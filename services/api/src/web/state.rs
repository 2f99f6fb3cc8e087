//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use quoteflow_core::normalizer::Normalizer;
use quoteflow_core::ports::QuoteSource;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub quote_source: Arc<dyn QuoteSource>,
    pub normalizer: Arc<Normalizer>,
}
