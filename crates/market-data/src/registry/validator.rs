//! Record validation.
//!
//! Validates normalized rows before they are cached or handed out:
//! - OHLC invariants (high bounds open/close from above, low from below)
//! - Non-negative prices and volume
//! - News records carry a title or content
//! - Soft sanity checks (price ceiling, zero volume) that only log

use log::warn;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::ValidationError;
use crate::models::{NewsRecord, QuoteRecord, Records};

/// Validator configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Whether to reject records with negative prices or volume.
    pub reject_negative_prices: bool,
    /// Price above which a warning is logged.
    pub max_price: Option<Decimal>,
    /// Whether to warn on zero volume.
    pub warn_on_zero_volume: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            reject_negative_prices: true,
            max_price: Some(Decimal::from(1_000_000_000i64)),
            warn_on_zero_volume: false,
        }
    }
}

/// Record validator.
///
/// A single hard failure rejects the whole batch: the rendering path never
/// sees a partially valid dataset from a provider.
#[derive(Clone, Debug, Default)]
pub struct QuoteValidator {
    config: ValidatorConfig,
}

impl QuoteValidator {
    /// Create a new validator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with custom configuration.
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Validate every record of a batch.
    pub fn validate_records(&self, records: &Records) -> Result<(), ValidationError> {
        match records {
            Records::Quotes(quotes) => quotes.iter().try_for_each(|q| self.validate(q)),
            Records::News(items) => items.iter().try_for_each(|n| self.validate_news(n)),
        }
    }

    /// Validate a quote.
    ///
    /// Returns the first hard failure. Soft issues are logged.
    pub fn validate(&self, quote: &QuoteRecord) -> Result<(), ValidationError> {
        let timestamp = quote.timestamp.to_rfc3339();

        if quote.high < quote.open.max(quote.close) {
            return Err(ValidationError::Ohlc {
                timestamp,
                message: format!(
                    "High ({}) is below max(open {}, close {})",
                    quote.high, quote.open, quote.close
                ),
            });
        }

        if quote.low > quote.open.min(quote.close) {
            return Err(ValidationError::Ohlc {
                timestamp,
                message: format!(
                    "Low ({}) is above min(open {}, close {})",
                    quote.low, quote.open, quote.close
                ),
            });
        }

        if self.config.reject_negative_prices {
            // low is the smallest price once the bounds above hold
            if quote.low < Decimal::ZERO {
                return Err(ValidationError::Negative {
                    timestamp,
                    field: "low",
                });
            }
            if quote.volume.is_some_and(|v| v < Decimal::ZERO) {
                return Err(ValidationError::Negative {
                    timestamp,
                    field: "volume",
                });
            }
        }

        for message in self.soft_warnings(quote) {
            warn!("Quote validation warning for {}: {}", timestamp, message);
        }

        Ok(())
    }

    /// Validate a news record.
    pub fn validate_news(&self, item: &NewsRecord) -> Result<(), ValidationError> {
        if item.is_blank() {
            return Err(ValidationError::BlankNews {
                time: item.time.clone(),
            });
        }
        Ok(())
    }

    /// Issues that are logged but never reject a record.
    fn soft_warnings(&self, quote: &QuoteRecord) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Some(max_price) = self.config.max_price {
            if quote.high > max_price {
                warnings.push(format!(
                    "High price ({}) exceeds max threshold ({})",
                    quote.high, max_price
                ));
            }
        }

        if self.config.warn_on_zero_volume && quote.volume == Some(Decimal::ZERO) {
            warnings.push("Zero volume (market may be closed)".to_string());
        }

        warnings
    }
}
