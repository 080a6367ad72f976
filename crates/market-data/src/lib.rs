//! MarketPulse Market Data Crate
//!
//! This crate provides the data acquisition layer for the MarketPulse
//! dashboard: daily OHLC quote series and a global financial news feed.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Multiple quote providers: Yahoo Finance, Stooq
//! - Multiple news providers: Eastmoney, Sina
//! - Tiered fallback across providers in priority order
//! - TTL caching of live results
//! - Deterministic synthetic data when every provider fails
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   DataRequest    |  (kind + symbol + period)
//! +------------------+
//!          |
//!          v
//! +----------------------+     +------------------+
//! | CachedFallbackFetcher| --> |   ResultCache    |  (TTL, per-key locks)
//! +----------------------+     +------------------+
//!          |  miss
//!          v
//! +------------------+
//! |    Providers     |  (tried in order, each under a timeout)
//! +------------------+
//!          |  raw rows
//!          v
//! +------------------+
//! |    Normalize     |  (column aliases -> canonical records)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Validator     |  (OHLC invariants, blank news)
//! +------------------+
//!          |  all providers failed
//!          v
//! +------------------+
//! |   Synthetic      |  (seeded random walk, placeholder headlines)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`DataRequest`] - What the caller asks for
//! - [`FetchResult`] - Rows plus provenance and source label
//! - [`QuoteRecord`] - Daily OHLC bar
//! - [`NewsRecord`] - News headline
//! - [`Provenance`] - Live, cached or synthetic

pub mod cache;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod synthetic;

// Re-export all public types from models
pub use models::{
    DataKind, DataRequest, FetchResult, NewsRecord, Period, Provenance, ProviderId, QuoteRecord,
    RawRow, Records, RequestKey,
};

pub use cache::{Clock, ManualClock, SystemClock};
pub use errors::{AttemptError, ConfigError, ProviderError, ValidationError};

// Re-export provider types
pub use provider::eastmoney::EastmoneyProvider;
pub use provider::sina::SinaProvider;
pub use provider::stooq::StooqProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{build_chain, provider_by_id, DataProvider};

// Re-export registry types
pub use registry::{
    AttemptOutcome, CachedFallbackFetcher, FetchDiagnostics, FetcherConfig, ProviderAttempt,
    QuoteValidator, ValidatorConfig,
};

pub use synthetic::{SyntheticConfig, SyntheticGenerator, SYNTHETIC_SOURCE};
