//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use quoteflow_core::domain::{Category, Quote};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_quote_handler,
        list_categories_handler,
    ),
    components(
        schemas(GenerateQuoteRequest, QuoteResponse, CategoryResponse, ErrorBody)
    ),
    tags(
        (name = "QuoteFlow API", description = "Category-based quote generation backed by an upstream webhook.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

pub const CATEGORY_REQUIRED: &str = "Category is required";
pub const GENERATION_FAILED: &str = "Failed to generate quote";

#[derive(Deserialize, ToSchema)]
pub struct GenerateQuoteRequest {
    /// One of: romantic, inspirational, motivational, wisdom, success, life.
    pub category: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// The normalized quote returned to the client.
#[derive(Serialize, ToSchema)]
pub struct QuoteResponse {
    pub id: String,
    pub text: String,
    pub author: String,
    pub category: CategoryResponse,
}

/// Body of every non-2xx response. Never carries upstream detail.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            color: category.color,
        }
    }
}

impl From<Quote> for QuoteResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            text: quote.text,
            author: quote.author,
            category: quote.category.into(),
        }
    }
}

type ApiRejection = (StatusCode, Json<ErrorBody>);

fn reject(status: StatusCode, message: &str) -> ApiRejection {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Generate a quote for a category.
///
/// Forwards the category to the upstream webhook once and normalizes its answer.
/// The body is read as JSON whatever its declared content type.
#[utoipa::path(
    post,
    path = "/api/generate-quote",
    request_body = GenerateQuoteRequest,
    responses(
        (status = 200, description = "Quote generated", body = QuoteResponse),
        (status = 400, description = "Category is missing", body = ErrorBody),
        (status = 500, description = "Upstream or normalization failure", body = ErrorBody)
    )
)]
pub async fn generate_quote_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiRejection> {
    let category = match serde_json::from_slice::<GenerateQuoteRequest>(&body) {
        Ok(GenerateQuoteRequest {
            category: Some(category),
        }) if !category.trim().is_empty() => category,
        Ok(_) => return Err(reject(StatusCode::BAD_REQUEST, CATEGORY_REQUIRED)),
        Err(e) => {
            warn!("Rejected generate-quote body: {}", e);
            return Err(reject(StatusCode::BAD_REQUEST, CATEGORY_REQUIRED));
        }
    };

    let raw = app_state
        .quote_source
        .fetch_raw(&category)
        .await
        .map_err(|e| {
            error!(category = %category, "Error generating quote: {:?}", e);
            reject(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED)
        })?;

    let quote = app_state.normalizer.normalize(&raw, &category).map_err(|e| {
        error!(category = %category, "Error generating quote: {:?}", e);
        reject(StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED)
    })?;

    info!(quote_id = %quote.id, "Quote generated.");
    Ok(Json(QuoteResponse::from(quote)))
}

/// List the category catalog.
#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "The six fixed categories", body = [CategoryResponse])
    )
)]
pub async fn list_categories_handler() -> impl IntoResponse {
    let categories: Vec<CategoryResponse> =
        Category::all().into_iter().map(CategoryResponse::from).collect();
    Json(categories)
}
