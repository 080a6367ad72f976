//! Yahoo Finance quote provider.
//!
//! Uses the chart endpoint (through `yahoo_finance_api`) to fetch daily bars
//! for equities, ETFs, indices and crypto pairs (e.g. AAPL, ^GSPC, BTC-USD).

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use crate::errors::ProviderError;
use crate::models::{DataKind, DataRequest, RawRow};
use crate::provider::DataProvider;

pub const PROVIDER_ID: &str = "YAHOO";

/// Yahoo Finance quote provider.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub fn new() -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| ProviderError::Unreachable {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to initialize Yahoo connector: {}", e),
        })?;
        Ok(Self { connector })
    }

    fn map_error(error: yahoo::YahooError) -> ProviderError {
        if matches!(error, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
            return ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            };
        }

        let message = error.to_string();
        if message.contains("429") || message.to_ascii_lowercase().contains("too many") {
            ProviderError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            }
        } else {
            ProviderError::Unreachable {
                provider: PROVIDER_ID.to_string(),
                message,
            }
        }
    }

    /// Yahoo bar in its own column naming.
    fn to_raw_row(quote: &yahoo::Quote) -> RawRow {
        let mut row = RawRow::new();
        row.insert("timestamp".to_string(), json!(quote.timestamp));
        row.insert("open".to_string(), json!(quote.open));
        row.insert("high".to_string(), json!(quote.high));
        row.insert("low".to_string(), json!(quote.low));
        row.insert("close".to_string(), json!(quote.close));
        row.insert("adjclose".to_string(), json!(quote.adjclose));
        row.insert("volume".to_string(), json!(quote.volume));
        row
    }
}

#[async_trait]
impl DataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn kind(&self) -> DataKind {
        DataKind::Quotes
    }

    async fn fetch(&self, request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        let (symbol, period) =
            request
                .quote_params()
                .ok_or_else(|| ProviderError::SchemaMismatch {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("Not a quote request: {}", request.cache_key()),
                })?;

        debug!("Fetching {} daily bars for {} from Yahoo", period, symbol);

        let response = self
            .connector
            .get_quote_range(symbol, "1d", period.as_str())
            .await
            .map_err(Self::map_error)?;

        let quotes = response.quotes().map_err(|e| {
            warn!("No quotes returned for {}: {}", symbol, e);
            Self::map_error(e)
        })?;

        if quotes.is_empty() {
            return Err(ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Ok(quotes.iter().map(Self::to_raw_row).collect())
    }
}
