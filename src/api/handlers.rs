use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::aggregator::Aggregator;
use crate::data_models::SearchResult;
use crate::diagnostics::{self, DomReport, InspectReport, RawReport};
use crate::query::SearchQuery;

use super::models::{ErrorResponse, SearchParams};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Cancelled when dropped, i.e. when the client goes away before the response is ready.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

pub async fn search_handler(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResult>, ApiError> {
    let query = SearchQuery::parse(params.q.as_deref().unwrap_or_default()).map_err(|e| {
        log::debug!("rejected query: {e}");
        bad_request("Invalid query")
    })?;

    let (token, _guard) = request_token();
    let result = aggregator.search(&query, &token).await;
    Ok(Json(result))
}

fn required_q(params: &SearchParams) -> Result<String, ApiError> {
    let q = params.q.as_deref().unwrap_or_default().trim();
    if q.is_empty() {
        return Err(bad_request("q required"));
    }
    Ok(q.to_string())
}

pub async fn debug_handler(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<InspectReport>, ApiError> {
    let q = required_q(&params)?;
    let (token, _guard) = request_token();
    Ok(Json(diagnostics::inspect(&aggregator, &q, &token).await))
}

pub async fn debug_raw_handler(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RawReport>, ApiError> {
    let q = required_q(&params)?;
    let (token, _guard) = request_token();
    Ok(Json(diagnostics::raw(&aggregator, &q, &token).await))
}

pub async fn debug_dom_handler(
    State(aggregator): State<Arc<Aggregator>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<DomReport>, ApiError> {
    let q = required_q(&params)?;
    let (token, _guard) = request_token();
    Ok(Json(diagnostics::scan_dom(&aggregator, &q, &token).await))
}
