//! Per-request record of provider attempts.

use crate::errors::AttemptError;
use crate::models::ProviderId;

/// Outcome of calling one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Provider returned rows that normalized and validated.
    Success { rows: usize },
    Failed(AttemptError),
}

/// Record of a single provider attempt during a fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub outcome: AttemptOutcome,
}

/// Detailed record of a fetch: which providers were tried and how they fared.
///
/// Empty when the result was served from cache.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: AttemptError) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Failed(error),
        });
    }

    pub fn record_success(&mut self, provider_id: ProviderId, rows: usize) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Success { rows },
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no provider attempts".to_string();
        }

        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success { rows } => {
                    format!("{}: SUCCESS ({} rows)", a.provider_id, rows)
                }
                AttemptOutcome::Failed(err) => format!("{}: ERROR ({})", a.provider_id, err),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| matches!(a.outcome, AttemptOutcome::Success { .. }))
    }

    /// Get all errors.
    pub fn errors(&self) -> Vec<(&ProviderId, &AttemptError)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed(e) => Some((&a.provider_id, e)),
                AttemptOutcome::Success { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::errors::ProviderError;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_error(
            Cow::Borrowed("YAHOO"),
            ProviderError::Timeout {
                provider: "YAHOO".to_string(),
            }
            .into(),
        );
        diag.record_success(Cow::Borrowed("STOOQ"), 21);

        assert_eq!(
            diag.summary(),
            "YAHOO: ERROR (Timeout: YAHOO) -> STOOQ: SUCCESS (21 rows)"
        );
    }

    #[test]
    fn test_has_success() {
        let mut diag = FetchDiagnostics::new();
        diag.record_error(
            Cow::Borrowed("A"),
            ProviderError::Empty {
                provider: "A".to_string(),
            }
            .into(),
        );
        assert!(!diag.has_success());
        assert_eq!(diag.errors().len(), 1);

        diag.record_success(Cow::Borrowed("B"), 3);
        assert!(diag.has_success());
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FetchDiagnostics::new().summary(), "no provider attempts");
    }
}
