pub mod domain;
pub mod generator;
pub mod memory;
pub mod normalizer;
pub mod ports;
pub mod store;

pub use domain::{Category, DailyGenerationCounter, Quote, CATEGORIES};
pub use generator::{GenerateError, QuoteGenerator};
pub use memory::InMemoryKeyValueStore;
pub use normalizer::{NormalizeError, Normalizer, PayloadShape};
pub use ports::{Clock, KeyValueStore, PortError, PortResult, QuoteEndpoint, QuoteSource, SystemClock};
pub use store::{QuotesSnapshot, QuotesStore};
