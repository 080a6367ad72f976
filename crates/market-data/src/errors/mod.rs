//! Error types for the market data crate.
//!
//! This module provides:
//! - [`ProviderError`]: Failures raised by a single provider call
//! - [`ValidationError`]: Normalized rows that break a record invariant
//! - [`ConfigError`]: Startup configuration problems (fatal, never per-request)
//! - [`AttemptError`]: The union of the first two, as seen by the fallback loop
//!
//! Provider and validation errors never leave the fetcher. They are recorded in
//! [`FetchDiagnostics`](crate::registry::FetchDiagnostics) and logged, and the
//! caller only observes the provenance of the returned data.

use thiserror::Error;

use crate::models::DataKind;

/// Errors that can occur while calling a single provider.
///
/// Every variant causes the fetcher to move on to the next provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The call did not complete within the configured provider timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider could not be reached or answered with a failure status.
    #[error("Unreachable: {provider} - {message}")]
    Unreachable {
        /// The provider that could not be reached
        provider: String,
        /// Transport or status details
        message: String,
    },

    /// The provider answered, but the payload does not have the expected shape.
    #[error("Schema mismatch: {provider} - {message}")]
    SchemaMismatch {
        /// The provider that returned the payload
        provider: String,
        /// What was missing or malformed
        message: String,
    },

    /// The provider answered with zero rows.
    /// Treated as a failure so an empty dataset is never cached.
    #[error("Empty response: {provider}")]
    Empty {
        /// The provider that returned no rows
        provider: String,
    },
}

impl ProviderError {
    /// The provider that raised this error.
    pub fn provider(&self) -> &str {
        match self {
            Self::Timeout { provider }
            | Self::RateLimited { provider }
            | Self::Unreachable { provider, .. }
            | Self::SchemaMismatch { provider, .. }
            | Self::Empty { provider } => provider,
        }
    }

    /// Whether the failure is likely to clear up on its own.
    ///
    /// Transient failures are logged at a lower level since the provider is
    /// expected to recover before the next cache miss.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::RateLimited { .. })
    }
}

/// Normalized rows that break a record invariant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// High/low do not bound open and close.
    #[error("OHLC invariant violated at {timestamp}: {message}")]
    Ohlc {
        /// Timestamp of the offending record
        timestamp: String,
        /// Which bound was broken
        message: String,
    },

    /// A price or volume is negative.
    #[error("Negative value at {timestamp}: {field}")]
    Negative {
        /// Timestamp of the offending record
        timestamp: String,
        /// Name of the negative field
        field: &'static str,
    },

    /// A news record has neither title nor content.
    #[error("Blank news record at {time}")]
    BlankNews {
        /// Time label of the offending record
        time: String,
    },
}

/// A failed provider attempt as seen by the fallback loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Validation failed: {provider} - {source}")]
    Validation {
        provider: String,
        #[source]
        source: ValidationError,
    },
}

impl AttemptError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_transient(),
            Self::Validation { .. } => false,
        }
    }
}

/// Configuration problems detected while building the fetcher.
///
/// These are fatal at startup and never raised per request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No provider is configured for a data kind.
    #[error("No providers configured for {0}")]
    NoProviders(DataKind),

    /// A provider was registered for the wrong data kind.
    #[error("Provider {provider} serves {actual}, not {expected}")]
    KindMismatch {
        provider: String,
        expected: DataKind,
        actual: DataKind,
    },

    /// A provider id in the priority list is not known.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// A configuration value could not be parsed or is out of range.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_and_rate_limit_are_transient() {
        let error = ProviderError::Timeout {
            provider: "YAHOO".to_string(),
        };
        assert!(error.is_transient());

        let error = ProviderError::RateLimited {
            provider: "YAHOO".to_string(),
        };
        assert!(error.is_transient());
    }

    #[test]
    fn test_structural_failures_are_not_transient() {
        let error = ProviderError::SchemaMismatch {
            provider: "STOOQ".to_string(),
            message: "missing close".to_string(),
        };
        assert!(!error.is_transient());

        let error = ProviderError::Empty {
            provider: "SINA".to_string(),
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_provider_accessor() {
        let error = ProviderError::Unreachable {
            provider: "EASTMONEY".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(error.provider(), "EASTMONEY");
    }

    #[test]
    fn test_validation_attempt_is_not_transient() {
        let error = AttemptError::Validation {
            provider: "YAHOO".to_string(),
            source: ValidationError::BlankNews {
                time: "10:00".to_string(),
            },
        };
        assert!(!error.is_transient());
    }

    #[test]
    fn test_error_display() {
        let error = ProviderError::Timeout {
            provider: "YAHOO".to_string(),
        };
        assert_eq!(format!("{}", error), "Timeout: YAHOO");

        let error = ProviderError::SchemaMismatch {
            provider: "STOOQ".to_string(),
            message: "missing column: close".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Schema mismatch: STOOQ - missing column: close"
        );

        let error = ConfigError::NoProviders(DataKind::News);
        assert_eq!(format!("{}", error), "No providers configured for news");

        let attempt: AttemptError = ProviderError::Empty {
            provider: "SINA".to_string(),
        }
        .into();
        assert_eq!(format!("{}", attempt), "Empty response: SINA");
    }
}
