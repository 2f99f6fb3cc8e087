#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use api_lib::web::{self, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use quoteflow_core::normalizer::{Normalizer, PayloadShape};
use quoteflow_core::ports::{PortError, PortResult, QuoteSource};
use serde_json::{json, Value};
use tower::ServiceExt;

/// A `QuoteSource` stand-in that records every category it is asked for.
pub struct StubQuoteSource {
    reply: Result<Value, String>,
    calls: AtomicUsize,
    categories: Mutex<Vec<String>>,
}

impl StubQuoteSource {
    /// Replies with `text` at `content.parts[0].text`.
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with_payload(json!({
            "content": { "parts": [ { "text": text } ], "role": "model" }
        }))
    }

    pub fn with_payload(payload: Value) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(payload),
            calls: AtomicUsize::new(0),
            categories: Mutex::new(Vec::new()),
        })
    }

    /// Fails like an unreachable webhook, with a detail that must not leak.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("connect ECONNREFUSED upstream.internal:443".to_string()),
            calls: AtomicUsize::new(0),
            categories: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuoteSource for StubQuoteSource {
    async fn fetch_raw(&self, category_id: &str) -> PortResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.categories.lock().unwrap().push(category_id.to_string());
        self.reply.clone().map_err(PortError::Upstream)
    }
}

/// Build the API router around the given upstream stand-in.
pub fn build_test_app(source: Arc<StubQuoteSource>, shape: PayloadShape) -> Router {
    let state = Arc::new(AppState {
        quote_source: source,
        normalizer: Arc::new(Normalizer::new(shape)),
    });
    web::router(state)
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Posts `body` with no `Content-Type` header at all.
pub async fn post_untyped(app: Router, uri: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
