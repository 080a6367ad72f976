use std::sync::Arc;

use crate::config::Config;
use marketpulse_market_data::{build_chain, CachedFallbackFetcher, DataKind};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub fetcher: CachedFallbackFetcher,
}

impl AppState {
    pub fn new(fetcher: CachedFallbackFetcher) -> Arc<Self> {
        Arc::new(Self { fetcher })
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("MP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let mut providers = build_chain(DataKind::Quotes, &config.quote_providers)?;
    providers.extend(build_chain(DataKind::News, &config.news_providers)?);

    let fetcher = CachedFallbackFetcher::new(config.fetcher.clone(), providers)?;
    tracing::info!(
        "Provider order. Quotes: {:?}, news: {:?}. TTLs: quotes {}s, news {}s",
        fetcher.provider_order(DataKind::Quotes),
        fetcher.provider_order(DataKind::News),
        fetcher.config().quotes_ttl_secs,
        fetcher.config().news_ttl_secs
    );

    Ok(AppState::new(fetcher))
}
