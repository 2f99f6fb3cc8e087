//! crates/quoteflow_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like the upstream
//! webhook, the HTTP transport, or on-device storage.

use async_trait::async_trait;
use chrono::{Local, NaiveDate, Utc};
use crate::domain::Quote;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Network failure or non-success status from a remote collaborator.
    #[error("Upstream request failed: {0}")]
    Upstream(String),
    /// A remote collaborator answered, but with a body we could not use.
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// Durable storage could not be read or written.
    #[error("Storage failure: {0}")]
    Storage(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The external quote producer (the upstream webhook).
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Requests a quote for `category_id` and returns the raw, untyped payload.
    async fn fetch_raw(&self, category_id: &str) -> PortResult<serde_json::Value>;
}

/// The quote request endpoint, as seen from the client side.
#[async_trait]
pub trait QuoteEndpoint: Send + Sync {
    async fn generate_quote(&self, category_id: &str) -> PortResult<Quote>;
}

/// String-keyed, string-valued durable storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> PortResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> PortResult<()>;
}

/// Source of the current calendar day and wall-clock time.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;

    fn now_millis(&self) -> i64;
}

/// The real clock. Calendar days follow the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
