//! Normalization of provider-native rows into canonical records.
//!
//! Providers keep their own column naming; this module reconciles the known
//! aliases (English, Chinese and terse single-letter forms) into
//! [`QuoteRecord`](crate::models::QuoteRecord) and
//! [`NewsRecord`](crate::models::NewsRecord). Lookups are case-insensitive.

mod fields;
mod news;
mod quotes;

pub use news::normalize_news;
pub use quotes::normalize_quotes;

use crate::errors::ProviderError;
use crate::models::{DataKind, RawRow, Records};

/// Normalize raw rows of the given kind.
pub fn normalize(
    provider: &str,
    kind: DataKind,
    rows: Vec<RawRow>,
) -> Result<Records, ProviderError> {
    match kind {
        DataKind::Quotes => normalize_quotes(provider, rows).map(Records::Quotes),
        DataKind::News => normalize_news(provider, rows).map(Records::News),
    }
}
