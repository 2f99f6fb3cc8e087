//! crates/quoteflow_core/src/normalizer.rs
//!
//! Turns the upstream webhook's raw payload into a well-formed [`Quote`].
//!
//! The upstream places its answer in a string at `content.parts[0].text`. What
//! that string contains depends on how the webhook is wired, so the expected
//! [`PayloadShape`] is a deployment setting. Exactly one shape is tried.

use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Category, Quote};
use crate::ports::{Clock, SystemClock};

/// Author recorded when the upstream does not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const AUTHOR_SEPARATOR: &str = " - ";

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The upstream answered, but no quote could be read out of it.
    #[error("Malformed upstream payload: {0}")]
    MalformedUpstreamPayload(String),
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown upstream payload shape '{0}' (expected 'delimited' or 'json')")]
pub struct UnknownPayloadShape(pub String);

//=========================================================================================
// Payload Shape
//=========================================================================================

/// The two known encodings of the quote string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadShape {
    /// `"<text> - <author>"`, author optional.
    #[default]
    Delimited,
    /// A JSON document `{"quote": ..., "author": ...}` serialized into the string.
    NestedJson,
}

impl FromStr for PayloadShape {
    type Err = UnknownPayloadShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delimited" => Ok(Self::Delimited),
            "json" | "nested-json" | "nested_json" => Ok(Self::NestedJson),
            other => Err(UnknownPayloadShape(other.to_string())),
        }
    }
}

//=========================================================================================
// Quote Ids
//=========================================================================================

/// Issues `<categoryId>_<millis>` ids whose millisecond part never repeats
/// within the process, even for back-to-back calls in the same millisecond.
#[derive(Debug, Default)]
pub struct QuoteIdGenerator {
    last_millis: AtomicI64,
}

impl QuoteIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `now` if it is past the last issued value, otherwise last + 1.
    pub fn next_millis(&self, now: i64) -> i64 {
        let mut prev = self.last_millis.load(Ordering::Acquire);
        loop {
            let next = if now > prev { now } else { prev + 1 };
            match self.last_millis.compare_exchange_weak(
                prev,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => prev = actual,
            }
        }
    }

    pub fn next_id(&self, category_id: &str, now: i64) -> String {
        format!("{}_{}", category_id, self.next_millis(now))
    }
}

//=========================================================================================
// Normalizer
//=========================================================================================

pub struct Normalizer {
    shape: PayloadShape,
    ids: QuoteIdGenerator,
    clock: Arc<dyn Clock>,
}

impl Normalizer {
    /// Creates a normalizer for one payload shape, stamping ids from the system clock.
    pub fn new(shape: PayloadShape) -> Self {
        Self::with_clock(shape, Arc::new(SystemClock))
    }

    pub fn with_clock(shape: PayloadShape, clock: Arc<dyn Clock>) -> Self {
        Self {
            shape,
            ids: QuoteIdGenerator::new(),
            clock,
        }
    }

    /// Converts a raw upstream payload for `category_id` into a [`Quote`].
    pub fn normalize(&self, raw: &Value, category_id: &str) -> Result<Quote, NormalizeError> {
        let quote_text = extract_text(raw)?;

        let (text, author) = match self.shape {
            PayloadShape::Delimited => split_delimited(quote_text)?,
            PayloadShape::NestedJson => parse_nested_json(quote_text)?,
        };

        Ok(Quote {
            id: self.ids.next_id(category_id, self.clock.now_millis()),
            text,
            author,
            category: Category::resolve(category_id),
        })
    }
}

/// Reads the string at `content.parts[0].text`.
fn extract_text(raw: &Value) -> Result<&str, NormalizeError> {
    let text = raw
        .pointer("/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            NormalizeError::MalformedUpstreamPayload(
                "no string at content.parts[0].text".to_string(),
            )
        })?;

    if text.trim().is_empty() {
        return Err(NormalizeError::MalformedUpstreamPayload(
            "upstream returned an empty quote".to_string(),
        ));
    }
    Ok(text)
}

fn split_delimited(quote_text: &str) -> Result<(String, String), NormalizeError> {
    let mut segments = quote_text.split(AUTHOR_SEPARATOR).map(str::trim);

    let text = segments.next().unwrap_or_default();
    if text.is_empty() {
        return Err(NormalizeError::MalformedUpstreamPayload(
            "quote text before the author separator is empty".to_string(),
        ));
    }
    let author = segments.next().filter(|a| !a.is_empty()).unwrap_or(UNKNOWN_AUTHOR);

    Ok((text.to_string(), author.to_string()))
}

fn parse_nested_json(quote_text: &str) -> Result<(String, String), NormalizeError> {
    let inner: Value = serde_json::from_str(quote_text).map_err(|e| {
        NormalizeError::MalformedUpstreamPayload(format!("nested quote is not JSON: {}", e))
    })?;

    let text = inner
        .get("quote")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            NormalizeError::MalformedUpstreamPayload(
                "nested quote has no 'quote' string".to_string(),
            )
        })?;
    let author = inner
        .get("author")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR);

    Ok((text.to_string(), author.to_string()))
}
