//! Stooq quote provider.
//!
//! Downloads daily bars as CSV from Stooq. No API key is needed, which makes
//! it a convenient second source behind Yahoo. Plain US tickers get the
//! `.us` market suffix Stooq expects.

use async_trait::async_trait;
use chrono::Duration;
use serde_json::Value;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{DataKind, DataRequest, RawRow};
use crate::provider::{DataProvider, HttpFetcher};

const BASE_URL: &str = "https://stooq.com/q/d/l/";
pub const PROVIDER_ID: &str = "STOOQ";

/// Stooq daily CSV provider.
pub struct StooqProvider {
    http: HttpFetcher,
}

impl StooqProvider {
    pub fn new() -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID),
        }
    }

    /// Stooq symbol for a ticker, e.g. `AAPL` -> `aapl.us`.
    fn stooq_symbol(symbol: &str) -> String {
        let lower = symbol.to_ascii_lowercase();
        if lower.contains('.') || lower.starts_with('^') {
            lower
        } else {
            format!("{}.us", lower)
        }
    }

    /// Parse a Stooq CSV body into rows keyed by the CSV header.
    fn parse_csv(body: &str) -> Result<Vec<RawRow>, ProviderError> {
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("no data") {
            return Err(ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let mut reader = csv::Reader::from_reader(trimmed.as_bytes());
        let headers = reader
            .headers()
            .map_err(|e| ProviderError::SchemaMismatch {
                provider: PROVIDER_ID.to_string(),
                message: format!("Unreadable CSV header: {}", e),
            })?
            .clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ProviderError::SchemaMismatch {
                provider: PROVIDER_ID.to_string(),
                message: format!("Malformed CSV row: {}", e),
            })?;

            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Ok(rows)
    }
}

impl Default for StooqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for StooqProvider {
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

        let end = request.requested_at.date_naive();
        let start = end - Duration::days(period.days());
        let stooq_symbol = Self::stooq_symbol(symbol);
        let d1 = start.format("%Y%m%d").to_string();
        let d2 = end.format("%Y%m%d").to_string();

        debug!("Fetching {} from Stooq between {} and {}", stooq_symbol, d1, d2);

        let body = self
            .http
            .get_text(
                BASE_URL,
                &[
                    ("s", stooq_symbol.as_str()),
                    ("i", "d"),
                    ("d1", d1.as_str()),
                    ("d2", d2.as_str()),
                ],
            )
            .await?;

        Self::parse_csv(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stooq_symbol() {
        assert_eq!(StooqProvider::stooq_symbol("AAPL"), "aapl.us");
        assert_eq!(StooqProvider::stooq_symbol("VOD.UK"), "vod.uk");
        assert_eq!(StooqProvider::stooq_symbol("^SPX"), "^spx");
    }

    #[test]
    fn test_parse_csv_keeps_native_columns() {
        let body = "Date,Open,High,Low,Close,Volume\n\
                    2024-01-02,187.15,188.44,183.89,185.64,82488674\n\
                    2024-01-03,184.22,185.88,183.43,184.25,58414460\n";
        let rows = StooqProvider::parse_csv(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Date"], Value::String("2024-01-02".to_string()));
        assert_eq!(rows[1]["Close"], Value::String("184.25".to_string()));
    }

    #[test]
    fn test_parse_csv_no_data_is_empty() {
        let err = StooqProvider::parse_csv("No data").unwrap_err();
        assert_eq!(
            err,
            ProviderError::Empty {
                provider: "STOOQ".to_string()
            }
        );
    }

    #[test]
    fn test_parse_csv_header_only_is_empty() {
        let err = StooqProvider::parse_csv("Date,Open,High,Low,Close,Volume\n").unwrap_err();
        assert!(matches!(err, ProviderError::Empty { .. }));
    }
}
