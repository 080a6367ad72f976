//! Provider orchestration.
//!
//! This module ties providers, the cache and the synthetic generator together:
//! - Ordered provider chains per data kind
//! - Per-provider timeouts and typed failure records
//! - Record validation before anything is cached
//! - TTL caching with coalesced concurrent misses

mod diagnostics;
mod fetcher;
mod validator;

pub use diagnostics::{AttemptOutcome, FetchDiagnostics, ProviderAttempt};
pub use fetcher::{
    CachedFallbackFetcher, FetcherConfig, DEFAULT_NEWS_TTL_SECS, DEFAULT_PROVIDER_TIMEOUT_MS,
    DEFAULT_QUOTES_TTL_SECS,
};
pub use validator::{QuoteValidator, ValidatorConfig};
