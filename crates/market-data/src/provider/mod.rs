//! Upstream data provider abstractions and implementations.
//!
//! This module contains:
//! - The `DataProvider` trait that all providers implement
//! - Shared HTTP plumbing that classifies transport failures
//! - Concrete provider implementations (Yahoo, Stooq, Eastmoney, Sina)
//!
//! # Architecture
//!
//! Providers are deliberately thin:
//! - **Raw**: rows are returned in the provider's own column naming; the
//!   fetcher normalizes them, so providers stay interchangeable
//! - **Single shot**: one network call per `fetch`, no retries; the ordered
//!   provider list is the retry mechanism
//! - **Classified**: every failure maps to one `ProviderError` variant

mod http;
mod traits;

pub mod eastmoney;
pub mod sina;
pub mod stooq;
pub mod yahoo;

pub use http::HttpFetcher;
pub use traits::DataProvider;

use std::sync::Arc;

use crate::errors::{ConfigError, ProviderError};
use crate::models::DataKind;

/// Build a provider from its id. Ids are matched case-insensitively.
pub fn provider_by_id(id: &str) -> Result<Arc<dyn DataProvider>, ConfigError> {
    let id = id.trim().to_ascii_uppercase();
    let provider: Arc<dyn DataProvider> = match id.as_str() {
        yahoo::PROVIDER_ID => Arc::new(yahoo::YahooProvider::new().map_err(|e: ProviderError| {
            ConfigError::InvalidValue {
                key: id.clone(),
                message: e.to_string(),
            }
        })?),
        stooq::PROVIDER_ID => Arc::new(stooq::StooqProvider::new()),
        eastmoney::PROVIDER_ID => Arc::new(eastmoney::EastmoneyProvider::new()),
        sina::PROVIDER_ID => Arc::new(sina::SinaProvider::new()),
        _ => return Err(ConfigError::UnknownProvider(id)),
    };
    Ok(provider)
}

/// Build an ordered provider chain for one kind.
///
/// Fails on unknown ids and on providers that serve a different kind.
pub fn build_chain<S: AsRef<str>>(
    kind: DataKind,
    ids: &[S],
) -> Result<Vec<Arc<dyn DataProvider>>, ConfigError> {
    let mut chain = Vec::with_capacity(ids.len());
    for id in ids {
        let provider = provider_by_id(id.as_ref())?;
        if provider.kind() != kind {
            return Err(ConfigError::KindMismatch {
                provider: provider.id().to_string(),
                expected: kind,
                actual: provider.kind(),
            });
        }
        chain.push(provider);
    }

    if chain.is_empty() {
        return Err(ConfigError::NoProviders(kind));
    }
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider() {
        assert_eq!(
            provider_by_id("bloomberg").err(),
            Some(ConfigError::UnknownProvider("BLOOMBERG".to_string()))
        );
    }

    #[test]
    fn test_chain_keeps_order() {
        let chain = build_chain(DataKind::News, &["sina", "EASTMONEY"]).unwrap();
        let ids: Vec<_> = chain.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["SINA", "EASTMONEY"]);
    }

    #[test]
    fn test_chain_rejects_wrong_kind() {
        let result = build_chain(DataKind::Quotes, &["STOOQ", "SINA"]);
        assert_eq!(
            result.err(),
            Some(ConfigError::KindMismatch {
                provider: "SINA".to_string(),
                expected: DataKind::Quotes,
                actual: DataKind::News,
            })
        );
    }

    #[test]
    fn test_empty_chain() {
        let ids: [&str; 0] = [];
        assert_eq!(
            build_chain(DataKind::Quotes, &ids).err(),
            Some(ConfigError::NoProviders(DataKind::Quotes))
        );
    }
}
