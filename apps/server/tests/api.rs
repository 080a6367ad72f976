use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
};
use marketpulse_market_data::{
    CachedFallbackFetcher, DataKind, DataProvider, DataRequest, FetcherConfig, ProviderError,
    RawRow,
};
use marketpulse_server::{api::app_router, config::Config, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct FixedQuotes;

#[async_trait]
impl DataProvider for FixedQuotes {
    fn id(&self) -> &'static str {
        "FIXED"
    }

    fn kind(&self) -> DataKind {
        DataKind::Quotes
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        Ok((1..=5)
            .map(|day| {
                json!({
                    "date": format!("2024-02-0{}", day),
                    "open": 10.0,
                    "high": 11.0,
                    "low": 9.5,
                    "close": 10.5,
                    "volume": 100
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect())
    }
}

struct CountingNews {
    calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl DataProvider for CountingNews {
    fn id(&self) -> &'static str {
        "WIRE"
    }

    fn kind(&self) -> DataKind {
        DataKind::News
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::RateLimited {
                provider: "WIRE".to_string(),
            });
        }
        Ok((0..40)
            .map(|i| {
                json!({
                    "time": format!("2024-02-05 09:{:02}:00", i),
                    "title": format!("Headline {}", i),
                    "content": "Body"
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect())
    }
}

/// Quote provider that never answers.
struct HangingQuotes(&'static str);

#[async_trait]
impl DataProvider for HangingQuotes {
    fn id(&self) -> &'static str {
        self.0
    }

    fn kind(&self) -> DataKind {
        DataKind::Quotes
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        std::future::pending().await
    }
}

fn build_test_router(news: Arc<CountingNews>) -> axum::Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let providers: Vec<Arc<dyn DataProvider>> = vec![Arc::new(FixedQuotes), news];
    let fetcher = CachedFallbackFetcher::new(FetcherConfig::default(), providers).unwrap();
    app_router(AppState::new(fetcher), &config)
}

fn news_provider(fail: bool) -> Arc<CountingNews> {
    Arc::new(CountingNews {
        calls: AtomicUsize::new(0),
        fail,
    })
}

async fn send(app: &axum::Router, method: Method, uri: &str) -> (u16, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status().as_u16();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn healthz_works() {
    let app = build_test_router(news_provider(false));
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn quotes_are_live_then_cached() {
    let app = build_test_router(news_provider(false));

    let (status, body) = send(&app, Method::GET, "/api/quotes/aapl?period=3mo").await;
    assert_eq!(status, 200);
    assert_eq!(body["provenance"], "live");
    assert_eq!(body["sourceLabel"], "FIXED");
    assert_eq!(body["rows"]["kind"], "quotes");
    assert_eq!(body["rows"]["items"].as_array().unwrap().len(), 5);

    let (_, body) = send(&app, Method::GET, "/api/quotes/AAPL?period=3mo").await;
    assert_eq!(body["provenance"], "cached");
}

#[tokio::test]
async fn bad_period_is_rejected() {
    let app = build_test_router(news_provider(false));

    let (status, body) = send(&app, Method::GET, "/api/quotes/AAPL?period=2w").await;
    assert_eq!(status, 400);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn news_limit_is_clamped() {
    let app = build_test_router(news_provider(false));

    let (_, body) = send(&app, Method::GET, "/api/news?limit=3").await;
    assert_eq!(body["rows"]["items"].as_array().unwrap().len(), 10);

    let (_, body) = send(&app, Method::GET, "/api/news").await;
    assert_eq!(body["rows"]["items"].as_array().unwrap().len(), 20);
}

#[tokio::test]
async fn news_outage_is_flagged_synthetic() {
    let app = build_test_router(news_provider(true));

    let (status, body) = send(&app, Method::GET, "/api/news").await;
    assert_eq!(status, 200);
    assert_eq!(body["provenance"], "synthetic");
    assert_eq!(body["sourceLabel"], "SYNTHETIC");
}

#[tokio::test]
async fn refresh_invalidates_and_refetches_news() {
    let news = news_provider(false);
    let app = build_test_router(news.clone());

    send(&app, Method::GET, "/api/news").await;
    send(&app, Method::GET, "/api/quotes/AAPL").await;
    assert_eq!(news.calls.load(Ordering::SeqCst), 1);

    let (status, body) = send(&app, Method::POST, "/api/refresh").await;
    assert_eq!(status, 200);
    assert_eq!(body["invalidated"], 2);
    assert_eq!(body["news"]["provenance"], "live");
    assert_eq!(news.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn hanging_chain_within_request_timeout_degrades_to_synthetic() {
    let config = Config::from_lookup(|key| match key {
        "MP_PROVIDER_TIMEOUT_SECS" => Some("1".to_string()),
        "MP_REQUEST_TIMEOUT_MS" => Some("2500".to_string()),
        _ => None,
    })
    .unwrap();
    let providers: Vec<Arc<dyn DataProvider>> = vec![
        Arc::new(HangingQuotes("SLOW_A")),
        Arc::new(HangingQuotes("SLOW_B")),
        news_provider(false),
    ];
    let fetcher = CachedFallbackFetcher::new(config.fetcher.clone(), providers).unwrap();
    let app = app_router(AppState::new(fetcher), &config);

    let (status, body) = send(&app, Method::GET, "/api/quotes/AAPL").await;
    assert_eq!(status, 200);
    assert_eq!(body["provenance"], "synthetic");
    assert_eq!(body["sourceLabel"], "SYNTHETIC");
}
