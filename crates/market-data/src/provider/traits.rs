//! Data provider trait definitions.
//!
//! This module defines the `DataProvider` trait that all upstream quote and
//! news sources must implement.

use async_trait::async_trait;

use crate::errors::ProviderError;
use crate::models::{DataKind, DataRequest, RawRow};

/// Trait for upstream data providers.
///
/// Implement this trait to add support for a new quote or news source.
/// The fetcher tries providers of a kind in their configured order and
/// stops at the first one that returns rows.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use marketpulse_market_data::provider::DataProvider;
///
/// struct MyFeed;
///
/// #[async_trait]
/// impl DataProvider for MyFeed {
///     fn id(&self) -> &'static str {
///         "MY_FEED"
///     }
///
///     fn kind(&self) -> DataKind {
///         DataKind::News
///     }
///
///     async fn fetch(&self, request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
///         // ... one network call, rows in the feed's own shape
///     }
/// }
/// ```
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "EASTMONEY", etc.
    /// Used for logging, configuration and the result's source label.
    fn id(&self) -> &'static str;

    /// The kind of data this provider serves.
    fn kind(&self) -> DataKind;

    /// Fetch raw rows for a request.
    ///
    /// # Arguments
    ///
    /// * `request` - The request; news providers ignore its key
    ///
    /// # Returns
    ///
    /// Rows in provider-native shape, or a `ProviderError`. Zero rows must be
    /// reported as `ProviderError::Empty`, never as `Ok(vec![])`.
    async fn fetch(&self, request: &DataRequest) -> Result<Vec<RawRow>, ProviderError>;
}
