use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of data the dashboard consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Quotes,
    News,
}

impl DataKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quotes => "quotes",
            Self::News => "news",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookback window for a quote series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "5d")]
    FiveDays,
    #[default]
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// Range token understood by chart-style APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FiveDays => "5d",
            Self::OneMonth => "1mo",
            Self::ThreeMonths => "3mo",
            Self::SixMonths => "6mo",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
        }
    }

    /// Approximate number of calendar days covered.
    pub fn days(&self) -> i64 {
        match self {
            Self::FiveDays => 5,
            Self::OneMonth => 31,
            Self::ThreeMonths => 92,
            Self::SixMonths => 183,
            Self::OneYear => 366,
            Self::FiveYears => 5 * 366,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5d" => Ok(Self::FiveDays),
            "1mo" => Ok(Self::OneMonth),
            "3mo" => Ok(Self::ThreeMonths),
            "6mo" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "5y" => Ok(Self::FiveYears),
            other => Err(format!("unsupported period: {}", other)),
        }
    }
}

/// What is being requested.
///
/// Quotes are keyed by symbol and period; news is a single global feed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RequestKey {
    Quotes { symbol: Arc<str>, period: Period },
    News,
}

impl RequestKey {
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Quotes { .. } => DataKind::Quotes,
            Self::News => DataKind::News,
        }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quotes { symbol, period } => write!(f, "quotes:{}:{}", symbol, period),
            Self::News => f.write_str("news"),
        }
    }
}

/// A single request for data. Immutable, created per call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataRequest {
    pub key: RequestKey,
    pub requested_at: DateTime<Utc>,
}

impl DataRequest {
    /// Request a daily OHLC series. The symbol is upper-cased and trimmed.
    pub fn quotes(symbol: &str, period: Period, requested_at: DateTime<Utc>) -> Self {
        Self {
            key: RequestKey::Quotes {
                symbol: Arc::from(symbol.trim().to_ascii_uppercase()),
                period,
            },
            requested_at,
        }
    }

    /// Request the global news feed.
    pub fn news(requested_at: DateTime<Utc>) -> Self {
        Self {
            key: RequestKey::News,
            requested_at,
        }
    }

    pub fn kind(&self) -> DataKind {
        self.key.kind()
    }

    /// String form of the key, used as the cache key.
    pub fn cache_key(&self) -> String {
        self.key.to_string()
    }

    /// Symbol and period for quote requests.
    pub fn quote_params(&self) -> Option<(&str, Period)> {
        match &self.key {
            RequestKey::Quotes { symbol, period } => Some((symbol.as_ref(), *period)),
            RequestKey::News => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_includes_kind_symbol_and_period() {
        let request = DataRequest::quotes(" aapl ", Period::ThreeMonths, Utc::now());
        assert_eq!(request.cache_key(), "quotes:AAPL:3mo");
        assert_eq!(request.kind(), DataKind::Quotes);
        assert_eq!(request.quote_params(), Some(("AAPL", Period::ThreeMonths)));
    }

    #[test]
    fn test_news_key_ignores_symbol() {
        let request = DataRequest::news(Utc::now());
        assert_eq!(request.cache_key(), "news");
        assert_eq!(request.kind(), DataKind::News);
        assert!(request.quote_params().is_none());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("1Y".parse::<Period>(), Ok(Period::OneYear));
        assert_eq!("5d".parse::<Period>(), Ok(Period::FiveDays));
        assert!("2w".parse::<Period>().is_err());
    }
}
