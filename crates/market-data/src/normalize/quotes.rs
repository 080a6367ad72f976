use log::debug;
use rust_decimal::Decimal;

use super::fields::{lookup, to_decimal, to_timestamp, Cell};
use crate::errors::ProviderError;
use crate::models::{QuoteRecord, RawRow};

const TIMESTAMP: &[&str] = &["timestamp", "date", "datetime", "time", "t", "日期", "时间"];
const OPEN: &[&str] = &["open", "o", "开盘", "开盘价"];
const HIGH: &[&str] = &["high", "h", "最高", "最高价"];
const LOW: &[&str] = &["low", "l", "最低", "最低价"];
const CLOSE: &[&str] = &["close", "c", "price", "收盘", "收盘价"];
const VOLUME: &[&str] = &["volume", "v", "vol", "成交量"];

enum Field {
    Value(Decimal),
    Null,
}

fn price(
    provider: &str,
    row: &RawRow,
    aliases: &[&str],
    name: &str,
) -> Result<Field, ProviderError> {
    match lookup(row, aliases) {
        Cell::Missing => Err(ProviderError::SchemaMismatch {
            provider: provider.to_string(),
            message: format!("Missing column: {}", name),
        }),
        Cell::Null => Ok(Field::Null),
        Cell::Present(value) => {
            to_decimal(value)
                .map(Field::Value)
                .ok_or_else(|| ProviderError::SchemaMismatch {
                    provider: provider.to_string(),
                    message: format!("Unparseable {}: {}", name, value),
                })
        }
    }
}

/// Map provider rows onto `QuoteRecord`, sorted by timestamp ascending.
///
/// Rows with a null price (exchange holidays in chart APIs) are dropped.
/// A missing column or unparseable value fails the whole batch with
/// `SchemaMismatch`; no surviving rows is `Empty`.
pub fn normalize_quotes(
    provider: &str,
    rows: Vec<RawRow>,
) -> Result<Vec<QuoteRecord>, ProviderError> {
    let mut records = Vec::with_capacity(rows.len());
    let mut dropped = 0usize;

    for row in &rows {
        let timestamp = match lookup(row, TIMESTAMP) {
            Cell::Present(value) => {
                to_timestamp(value).ok_or_else(|| ProviderError::SchemaMismatch {
                    provider: provider.to_string(),
                    message: format!("Unparseable timestamp: {}", value),
                })?
            }
            Cell::Null => {
                dropped += 1;
                continue;
            }
            Cell::Missing => {
                return Err(ProviderError::SchemaMismatch {
                    provider: provider.to_string(),
                    message: "Missing column: timestamp".to_string(),
                })
            }
        };

        let open = price(provider, row, OPEN, "open")?;
        let high = price(provider, row, HIGH, "high")?;
        let low = price(provider, row, LOW, "low")?;
        let close = price(provider, row, CLOSE, "close")?;

        let (open, high, low, close) = match (open, high, low, close) {
            (Field::Value(o), Field::Value(h), Field::Value(l), Field::Value(c)) => (o, h, l, c),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let volume = match lookup(row, VOLUME) {
            Cell::Present(value) => to_decimal(value),
            Cell::Null | Cell::Missing => None,
        };

        records.push(QuoteRecord {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        });
    }

    if dropped > 0 {
        debug!("{}: dropped {} rows with null prices", provider, dropped);
    }

    if records.is_empty() {
        return Err(ProviderError::Empty {
            provider: provider.to_string(),
        });
    }

    records.sort_by_key(|r| r.timestamp);
    Ok(records)
}
