//! Market data models
//!
//! This module contains the core data types for the acquisition layer:
//! - `types` - Type aliases for provider identifiers and raw provider rows
//! - `request` - What the caller asks for (DataRequest, RequestKey, Period, DataKind)
//! - `quote` - Canonical OHLC record (QuoteRecord)
//! - `news` - Canonical news record (NewsRecord)
//! - `result` - What the caller gets back (FetchResult, Records, Provenance)

mod news;
mod quote;
mod request;
mod result;
mod types;

pub use news::NewsRecord;
pub use quote::QuoteRecord;
pub use request::{DataKind, DataRequest, Period, RequestKey};
pub use result::{FetchResult, Provenance, Records};
pub use types::{ProviderId, RawRow};
