//! Cached, tiered-fallback fetcher.
//!
//! The fetcher manages the ordered provider lists for each data kind, handling:
//! - TTL caching of live results behind an injected clock
//! - Fallback to the next provider on any typed failure
//! - Per-provider timeouts
//! - Normalization and validation of provider rows
//! - Synthetic fallback when every provider fails
//!
//! It never returns an error. Degradation is only visible through the
//! result's provenance and source label.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use super::{FetchDiagnostics, QuoteValidator, ValidatorConfig};
use crate::cache::{Clock, ResultCache, SystemClock};
use crate::errors::{AttemptError, ConfigError, ProviderError};
use crate::models::{DataKind, DataRequest, FetchResult, ProviderId, Provenance, Records};
use crate::normalize::normalize;
use crate::provider::DataProvider;
use crate::synthetic::{SyntheticConfig, SyntheticGenerator, SYNTHETIC_SOURCE};

/// Default quote TTL.
pub const DEFAULT_QUOTES_TTL_SECS: u64 = 600;

/// Default news TTL (five minutes).
pub const DEFAULT_NEWS_TTL_SECS: u64 = 300;

/// Default per-provider timeout.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 8_000;

/// Fetcher configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// How long a live quote result stays valid.
    pub quotes_ttl_secs: u64,
    /// How long a live news result stays valid.
    pub news_ttl_secs: u64,
    /// Cache synthetic results for this long. `None` (the default) never
    /// caches them, so the next request retries the live providers.
    pub synthetic_ttl_secs: Option<u64>,
    /// Per-provider call timeout.
    pub provider_timeout_ms: u64,
    /// Synthetic fallback settings.
    pub synthetic: SyntheticConfig,
    /// Record validation settings.
    pub validator: ValidatorConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            quotes_ttl_secs: DEFAULT_QUOTES_TTL_SECS,
            news_ttl_secs: DEFAULT_NEWS_TTL_SECS,
            synthetic_ttl_secs: None,
            provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            synthetic: SyntheticConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

impl FetcherConfig {
    pub fn ttl(&self, kind: DataKind) -> chrono::Duration {
        let secs = match kind {
            DataKind::Quotes => self.quotes_ttl_secs,
            DataKind::News => self.news_ttl_secs,
        };
        chrono::Duration::seconds(secs as i64)
    }

    pub fn synthetic_ttl(&self) -> Option<chrono::Duration> {
        self.synthetic_ttl_secs
            .filter(|secs| *secs > 0)
            .map(|secs| chrono::Duration::seconds(secs as i64))
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_millis(self.provider_timeout_ms)
    }
}

/// Fetcher with per-kind provider chains, TTL cache and synthetic fallback.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct CachedFallbackFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    quote_providers: Vec<Arc<dyn DataProvider>>,
    news_providers: Vec<Arc<dyn DataProvider>>,
    cache: ResultCache,
    generator: SyntheticGenerator,
    validator: QuoteValidator,
    clock: Arc<dyn Clock>,
    config: FetcherConfig,
}

impl CachedFallbackFetcher {
    /// Create a fetcher using the wall clock.
    ///
    /// Providers are tried in the order given, per kind.
    pub fn new(
        config: FetcherConfig,
        providers: Vec<Arc<dyn DataProvider>>,
    ) -> Result<Self, ConfigError> {
        Self::with_clock(config, providers, Arc::new(SystemClock))
    }

    /// Create a fetcher with an injected clock.
    ///
    /// Fails with `ConfigError::NoProviders` if either kind has no provider.
    pub fn with_clock(
        config: FetcherConfig,
        providers: Vec<Arc<dyn DataProvider>>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        let (quote_providers, news_providers): (Vec<_>, Vec<_>) = providers
            .into_iter()
            .partition(|p| p.kind() == DataKind::Quotes);

        if quote_providers.is_empty() {
            return Err(ConfigError::NoProviders(DataKind::Quotes));
        }
        if news_providers.is_empty() {
            return Err(ConfigError::NoProviders(DataKind::News));
        }

        info!(
            "Fetcher ready. Quotes: [{}], news: [{}]",
            provider_ids(&quote_providers),
            provider_ids(&news_providers)
        );

        Ok(Self {
            inner: Arc::new(FetcherInner {
                quote_providers,
                news_providers,
                cache: ResultCache::new(),
                generator: SyntheticGenerator::new(config.synthetic.clone()),
                validator: QuoteValidator::with_config(config.validator.clone()),
                clock,
                config,
            }),
        })
    }

    /// Fetch data for a request. Never fails.
    ///
    /// Order of resolution:
    /// 1. A valid cache entry (tagged `Cached`)
    /// 2. The first provider, in priority order, whose rows normalize and
    ///    validate (tagged `Live`, cached for the kind's TTL)
    /// 3. Synthetic rows (tagged `Synthetic`)
    pub async fn fetch_with_fallback(&self, request: DataRequest) -> FetchResult {
        self.fetch_with_diagnostics(request).await.0
    }

    /// Fetch data and report which providers were tried.
    ///
    /// The diagnostics are empty for cache hits.
    pub async fn fetch_with_diagnostics(
        &self,
        request: DataRequest,
    ) -> (FetchResult, FetchDiagnostics) {
        let key = request.cache_key();

        if let Some(hit) = self.inner.cached(&key) {
            debug!("Cache hit for '{}'", key);
            return (hit, FetchDiagnostics::new());
        }

        debug!("Cache miss for '{}'", key);

        // Run the provider chain in its own task: if the caller goes away the
        // fetch still completes and lands in the cache.
        let inner = Arc::clone(&self.inner);
        let task_request = request.clone();
        match tokio::spawn(async move { inner.refresh(task_request).await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Fetch task for '{}' failed: {}", key, e);
                (self.inner.synthetic(&request), FetchDiagnostics::new())
            }
        }
    }

    /// Drop every cache entry immediately. Returns how many were dropped.
    pub fn invalidate_all(&self) -> usize {
        let dropped = self.inner.cache.invalidate_all();
        info!("Cache invalidated, {} entries dropped", dropped);
        dropped
    }

    /// Number of stored entries, expired ones included.
    pub fn cached_entries(&self) -> usize {
        self.inner.cache.len()
    }

    /// Provider ids for a kind, in priority order.
    pub fn provider_order(&self, kind: DataKind) -> Vec<&'static str> {
        self.inner.providers_for(kind).iter().map(|p| p.id()).collect()
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.inner.config
    }
}

impl FetcherInner {
    fn providers_for(&self, kind: DataKind) -> &[Arc<dyn DataProvider>] {
        match kind {
            DataKind::Quotes => &self.quote_providers,
            DataKind::News => &self.news_providers,
        }
    }

    /// Valid cached result for `key`, relabelled for the caller.
    ///
    /// Synthetic entries keep their provenance so the degraded banner stays.
    fn cached(&self, key: &str) -> Option<FetchResult> {
        let entry = self.cache.get_valid(key, self.clock.now())?;
        let mut result = entry.result.clone();
        if result.provenance == Provenance::Live {
            result.provenance = Provenance::Cached;
        }
        Some(result)
    }

    /// Run the provider chain for a request, holding the key's in-flight lock.
    ///
    /// The lock entry is released afterwards so one-off keys do not pile up.
    async fn refresh(&self, request: DataRequest) -> (FetchResult, FetchDiagnostics) {
        let key = request.cache_key();
        let lock = self.cache.flight_lock(&key);
        let outcome = {
            let _guard = lock.lock().await;
            self.refresh_locked(&key, request).await
        };
        drop(lock);
        self.cache.release_flight(&key);
        outcome
    }

    async fn refresh_locked(
        &self,
        key: &str,
        request: DataRequest,
    ) -> (FetchResult, FetchDiagnostics) {
        // Another caller may have filled the entry while we waited. Entries
        // stored by a fetch that started before an invalidation do not count.
        if let Some(hit) = self.cached(key) {
            debug!("Coalesced fetch for '{}' served from cache", key);
            return (hit, FetchDiagnostics::new());
        }

        let generation = self.cache.generation();
        let kind = request.kind();
        let mut diagnostics = FetchDiagnostics::new();

        for provider in self.providers_for(kind) {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            match self.attempt(provider.as_ref(), &request).await {
                Ok(rows) => {
                    diagnostics.record_success(provider_id, rows.len());

                    let now = self.clock.now();
                    let result = FetchResult {
                        rows,
                        provenance: Provenance::Live,
                        source_label: provider.id().to_string(),
                        fetched_at: now,
                    };
                    self.cache.store(
                        key,
                        result.clone(),
                        now + self.config.ttl(kind),
                        generation,
                    );

                    info!(
                        "Fetched {} {} rows for '{}'. Diagnostics: {}",
                        result.rows.len(),
                        kind,
                        key,
                        diagnostics.summary()
                    );
                    return (result, diagnostics);
                }
                Err(e) => {
                    if e.is_transient() {
                        info!("Provider '{}' failed for '{}': {}", provider_id, key, e);
                    } else {
                        warn!("Provider '{}' failed for '{}': {}", provider_id, key, e);
                    }
                    diagnostics.record_error(provider_id, e);
                }
            }
        }

        warn!(
            "All providers failed for '{}', serving synthetic data. Diagnostics: {}",
            key,
            diagnostics.summary()
        );

        let result = self.synthetic(&request);
        if let Some(ttl) = self.config.synthetic_ttl() {
            self.cache
                .store(key, result.clone(), result.fetched_at + ttl, generation);
        }
        (result, diagnostics)
    }

    /// One provider call: timeout, normalize, validate.
    async fn attempt(
        &self,
        provider: &dyn DataProvider,
        request: &DataRequest,
    ) -> Result<Records, AttemptError> {
        let raw = match tokio::time::timeout(self.config.provider_timeout(), provider.fetch(request))
            .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(ProviderError::Timeout {
                    provider: provider.id().to_string(),
                }
                .into())
            }
        };

        if raw.is_empty() {
            return Err(ProviderError::Empty {
                provider: provider.id().to_string(),
            }
            .into());
        }

        let records = normalize(provider.id(), request.kind(), raw)?;

        self.validator
            .validate_records(&records)
            .map_err(|source| AttemptError::Validation {
                provider: provider.id().to_string(),
                source,
            })?;

        Ok(records)
    }

    fn synthetic(&self, request: &DataRequest) -> FetchResult {
        FetchResult {
            rows: self.generator.generate_default(request),
            provenance: Provenance::Synthetic,
            source_label: SYNTHETIC_SOURCE.to_string(),
            fetched_at: self.clock.now(),
        }
    }
}

fn provider_ids(providers: &[Arc<dyn DataProvider>]) -> String {
    providers
        .iter()
        .map(|p| p.id())
        .collect::<Vec<_>>()
        .join(", ")
}
