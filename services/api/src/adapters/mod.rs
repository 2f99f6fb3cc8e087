pub mod endpoint_client;
pub mod file_store;
pub mod webhook;

pub use endpoint_client::HttpQuoteEndpoint;
pub use file_store::FileKeyValueStore;
pub use webhook::WebhookQuoteSource;
