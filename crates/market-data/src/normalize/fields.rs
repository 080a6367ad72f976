use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::models::RawRow;

/// Unix timestamps above this are milliseconds.
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A looked-up cell.
pub(crate) enum Cell<'a> {
    /// No alias matched any column.
    Missing,
    /// The column exists but holds null or an empty string.
    Null,
    Present(&'a Value),
}

/// First column whose name matches one of `aliases`, ignoring case.
pub(crate) fn lookup<'a>(row: &'a RawRow, aliases: &[&str]) -> Cell<'a> {
    for alias in aliases {
        let found = row
            .get(*alias)
            .or_else(|| {
                row.iter()
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case(alias))
                    .map(|(_, value)| value)
            });

        if let Some(value) = found {
            return match value {
                Value::Null => Cell::Null,
                Value::String(s) if s.trim().is_empty() => Cell::Null,
                other => Cell::Present(other),
            };
        }
    }
    Cell::Missing
}

/// Parse a JSON number or numeric string into a Decimal.
pub(crate) fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Decimal::from_u64(u)
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let cleaned = s.trim().replace(',', "");
            cleaned
                .parse::<Decimal>()
                .ok()
                .or_else(|| Decimal::from_scientific(&cleaned).ok())
        }
        _ => None,
    }
}

/// Parse a unix timestamp (seconds or milliseconds) or a date/time string.
pub(crate) fn to_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(from_unix),
        Value::String(s) => parse_datetime(s.trim()),
        _ => None,
    }
}

fn from_unix(raw: i64) -> Option<DateTime<Utc>> {
    if raw.abs() >= MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    s.parse::<i64>().ok().and_then(from_unix)
}

/// Render a cell as display text.
pub(crate) fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_ordered() {
        let r = row(json!({"Close": 10.5, "price": 11}));
        match lookup(&r, &["close", "price"]) {
            Cell::Present(v) => assert_eq!(v, &json!(10.5)),
            _ => panic!("expected close"),
        }
    }

    #[test]
    fn test_lookup_distinguishes_null_and_missing() {
        let r = row(json!({"open": null, "title": " "}));
        assert!(matches!(lookup(&r, &["open"]), Cell::Null));
        assert!(matches!(lookup(&r, &["title"]), Cell::Null));
        assert!(matches!(lookup(&r, &["high"]), Cell::Missing));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(&json!(42)), Some(dec!(42)));
        assert_eq!(to_decimal(&json!("1,234.50")), Some(dec!(1234.50)));
        assert_eq!(to_decimal(&json!("n/a")), None);
        assert!(to_decimal(&json!(187.15)).is_some());
    }

    #[test]
    fn test_to_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(to_timestamp(&json!("2024-01-02")), Some(expected));
        assert_eq!(to_timestamp(&json!(1704153600)), Some(expected));
        assert_eq!(to_timestamp(&json!(1704153600000i64)), Some(expected));
        assert_eq!(to_timestamp(&json!("2024-01-02T00:00:00Z")), Some(expected));
        assert_eq!(to_timestamp(&json!("2024-01-02 00:00:00")), Some(expected));
        assert_eq!(to_timestamp(&json!("yesterday")), None);
    }
}
