use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use marketpulse_market_data::{DataRequest, FetchResult, Period};
use serde::Serialize;

const DEFAULT_NEWS_LIMIT: usize = 20;
const MIN_NEWS_LIMIT: usize = 10;
const MAX_NEWS_LIMIT: usize = 100;
const MAX_SYMBOL_LEN: usize = 20;

#[derive(serde::Deserialize)]
struct QuotesQuery {
    period: Option<String>,
}

#[derive(serde::Deserialize)]
struct NewsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    invalidated: usize,
    news: FetchResult,
}

fn validate_symbol(symbol: &str) -> ApiResult<&str> {
    let symbol = symbol.trim();
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=');
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN || !symbol.chars().all(allowed) {
        return Err(ApiError::BadRequest(format!("Invalid symbol: '{}'", symbol)));
    }
    Ok(symbol)
}

fn news_limit(limit: Option<usize>) -> usize {
    limit
        .unwrap_or(DEFAULT_NEWS_LIMIT)
        .clamp(MIN_NEWS_LIMIT, MAX_NEWS_LIMIT)
}

async fn latest_news(state: &AppState, limit: usize) -> FetchResult {
    let mut result = state
        .fetcher
        .fetch_with_fallback(DataRequest::news(Utc::now()))
        .await;
    result.rows.truncate(limit);
    result
}

/// Daily OHLC series for a symbol. Always answers; degraded data is flagged
/// through `provenance`.
async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(q): Query<QuotesQuery>,
) -> ApiResult<Json<FetchResult>> {
    let symbol = validate_symbol(&symbol)?;
    let period = match q.period.as_deref() {
        Some(raw) => raw.parse::<Period>().map_err(ApiError::BadRequest)?,
        None => Period::default(),
    };

    let result = state
        .fetcher
        .fetch_with_fallback(DataRequest::quotes(symbol, period, Utc::now()))
        .await;
    Ok(Json(result))
}

async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(q): Query<NewsQuery>,
) -> ApiResult<Json<FetchResult>> {
    Ok(Json(latest_news(&state, news_limit(q.limit)).await))
}

/// Drop every cached result, then return a fresh news fetch.
async fn refresh(State(state): State<Arc<AppState>>) -> ApiResult<Json<RefreshResponse>> {
    let invalidated = state.fetcher.invalidate_all();
    let news = latest_news(&state, DEFAULT_NEWS_LIMIT).await;
    Ok(Json(RefreshResponse { invalidated, news }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes/{symbol}", get(get_quotes))
        .route("/news", get(get_news))
        .route("/refresh", post(refresh))
}
