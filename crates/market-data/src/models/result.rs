use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::news::NewsRecord;
use super::quote::QuoteRecord;
use super::request::DataKind;

/// Where the returned rows came from.
///
/// The rendering layer shows a degraded banner for `Synthetic`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Live,
    Cached,
    Synthetic,
}

/// Normalized rows, ordered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Records {
    Quotes(Vec<QuoteRecord>),
    News(Vec<NewsRecord>),
}

impl Records {
    pub fn kind(&self) -> DataKind {
        match self {
            Self::Quotes(_) => DataKind::Quotes,
            Self::News(_) => DataKind::News,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Quotes(rows) => rows.len(),
            Self::News(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn quotes(&self) -> Option<&[QuoteRecord]> {
        match self {
            Self::Quotes(rows) => Some(rows),
            Self::News(_) => None,
        }
    }

    pub fn news(&self) -> Option<&[NewsRecord]> {
        match self {
            Self::News(rows) => Some(rows),
            Self::Quotes(_) => None,
        }
    }

    /// Keep at most `n` rows from the front.
    pub fn truncate(&mut self, n: usize) {
        match self {
            Self::Quotes(rows) => rows.truncate(n),
            Self::News(rows) => rows.truncate(n),
        }
    }
}

/// Data handed to the rendering layer. The caller owns it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub rows: Records,
    pub provenance: Provenance,
    /// Provider id for live and cached data, `SYNTHETIC` otherwise.
    pub source_label: String,
    pub fetched_at: DateTime<Utc>,
}

impl FetchResult {
    pub fn is_degraded(&self) -> bool {
        self.provenance == Provenance::Synthetic
    }
}
