// pricefeed/src/api.rs
//
// Read-only HTTP Query Surface over the Product Table.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use pricefeed_core::PricefeedError;
use pricefeed_core::application::query::{
    DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE, TOP_PRODUCTS_LIMIT, search_products, top_products,
};
use pricefeed_core::domain::error::DomainError;
use pricefeed_core::domain::product::ProductRow;
use pricefeed_core::ports::connector::Connector;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::signal;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub connector: Arc<dyn Connector>,
}

impl AppState {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PricefeedError> for ApiError {
    fn from(err: PricefeedError) -> Self {
        match err {
            PricefeedError::Domain(e @ DomainError::InvalidPriceRange { .. }) => {
                ApiError::BadRequest(e.to_string())
            }
            other => {
                error!(error = %other, "Query failed");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    min_price: Option<f64>,
    #[serde(default)]
    max_price: Option<f64>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    engine: String,
    products: u64,
}

/// Builds the HTTP router for the Query Surface.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/top5", get(top5))
        .route("/search", get(search))
        .route("/health", get(health))
        .with_state(state)
}

async fn top5(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductRow>>> {
    let rows = top_products(state.connector.as_ref(), TOP_PRODUCTS_LIMIT).await?;
    Ok(Json(rows))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ProductRow>>> {
    let min = query.min_price.unwrap_or(DEFAULT_MIN_PRICE);
    let max = query.max_price.unwrap_or(DEFAULT_MAX_PRICE);
    let rows = search_products(state.connector.as_ref(), min, max).await?;
    Ok(Json(rows))
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let products = state.connector.count().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        engine: state.connector.engine_name().to_string(),
        products,
    }))
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind query listener on {}", addr))?;

    info!("Query API listening on {}", addr);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("query server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    info!("Shutdown signal received");
}
