use log::{debug, warn};

use super::fields::{lookup, to_text, to_timestamp, Cell};
use crate::errors::ProviderError;
use crate::models::{NewsRecord, RawRow};

const TIME: &[&str] = &[
    "time",
    "release time",
    "release_time",
    "publish_time",
    "showtime",
    "create_time",
    "datetime",
    "date",
    "发布时间",
    "时间",
];
const TITLE: &[&str] = &["title", "headline", "标题"];
const CONTENT: &[&str] = &["content", "summary", "digest", "body", "rich_text", "内容", "摘要"];

/// Characters of content used when a title has to be derived.
const DERIVED_TITLE_CHARS: usize = 40;

fn text(row: &RawRow, aliases: &[&str]) -> String {
    match lookup(row, aliases) {
        Cell::Present(value) => to_text(value),
        Cell::Null | Cell::Missing => String::new(),
    }
}

/// First sentence of `content`, capped at a fixed number of characters.
fn derive_title(content: &str) -> String {
    let first = content
        .split(['。', '\n'])
        .next()
        .unwrap_or(content)
        .trim();

    let mut chars = first.chars();
    let head: String = chars.by_ref().take(DERIVED_TITLE_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Time cell as display text; unix timestamps are rendered as `%Y-%m-%d %H:%M:%S`.
fn time_label(row: &RawRow) -> Option<String> {
    match lookup(row, TIME) {
        Cell::Present(value) if value.is_number() => to_timestamp(value)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .or_else(|| Some(to_text(value))),
        Cell::Present(value) => Some(to_text(value)),
        Cell::Null => Some(String::new()),
        Cell::Missing => None,
    }
}

/// Map provider rows onto `NewsRecord`, keeping provider order.
///
/// A missing title is derived from the content and a missing content is
/// copied from the title. Rows with neither are dropped. A feed with no time
/// column at all is `SchemaMismatch`; no surviving rows is `Empty`.
pub fn normalize_news(provider: &str, rows: Vec<RawRow>) -> Result<Vec<NewsRecord>, ProviderError> {
    let mut records = Vec::with_capacity(rows.len());
    let mut saw_time_column = false;
    let mut blank = 0usize;

    for row in &rows {
        let time = match time_label(row) {
            Some(label) => {
                saw_time_column = true;
                label
            }
            None => String::new(),
        };

        let mut title = text(row, TITLE);
        let mut content = text(row, CONTENT);

        if title.is_empty() && content.is_empty() {
            blank += 1;
            continue;
        }
        if title.is_empty() {
            title = derive_title(&content);
        }
        if content.is_empty() {
            content = title.clone();
        }

        records.push(NewsRecord {
            time,
            title,
            content,
        });
    }

    if !rows.is_empty() && !saw_time_column {
        return Err(ProviderError::SchemaMismatch {
            provider: provider.to_string(),
            message: "Missing column: time".to_string(),
        });
    }

    if blank > 0 {
        warn!("{}: dropped {} blank news items", provider, blank);
    }

    if records.is_empty() {
        return Err(ProviderError::Empty {
            provider: provider.to_string(),
        });
    }

    debug!("{}: normalized {} news items", provider, records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn rows(value: Value) -> Vec<RawRow> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_chinese_aliases() {
        let raw = rows(json!([
            {"发布时间": "2024-05-01 10:00:00", "标题": "央行维持利率不变", "内容": "央行宣布维持利率不变。"}
        ]));
        let records = normalize_news("EASTMONEY", raw).unwrap();
        assert_eq!(records[0].time, "2024-05-01 10:00:00");
        assert_eq!(records[0].title, "央行维持利率不变");
    }

    #[test]
    fn test_release_time_and_headline_aliases() {
        let raw = rows(json!([
            {"release time": "09:30", "headline": "Stocks open higher", "summary": "Indexes rose at the open."}
        ]));
        let records = normalize_news("FEED", raw).unwrap();
        assert_eq!(records[0].time, "09:30");
        assert_eq!(records[0].title, "Stocks open higher");
        assert_eq!(records[0].content, "Indexes rose at the open.");
    }

    #[test]
    fn test_title_filled_from_content() {
        let raw = rows(json!([
            {"create_time": "2024-05-01 10:00:00", "rich_text": "Gold hits a record high. Traders cite rate cuts."}
        ]));
        let records = normalize_news("SINA", raw).unwrap();
        assert_eq!(records[0].title, "Gold hits a record high. Traders cite ra…");
        assert_eq!(
            records[0].content,
            "Gold hits a record high. Traders cite rate cuts."
        );
    }

    #[test]
    fn test_content_filled_from_title() {
        let raw = rows(json!([{"time": "10:00", "title": "Oil up 2%", "content": ""}]));
        let records = normalize_news("FEED", raw).unwrap();
        assert_eq!(records[0].content, "Oil up 2%");
    }

    #[test]
    fn test_unix_time_is_formatted() {
        let raw = rows(json!([{"showTime": 1714557600, "title": "x"}]));
        let records = normalize_news("FEED", raw).unwrap();
        assert_eq!(records[0].time, "2024-05-01 10:00:00");
    }

    #[test]
    fn test_blank_rows_dropped() {
        let raw = rows(json!([
            {"time": "10:00", "title": "", "content": null},
            {"time": "10:01", "title": "Kept"}
        ]));
        let records = normalize_news("FEED", raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Kept");
    }

    #[test]
    fn test_no_time_column_is_schema_mismatch() {
        let raw = rows(json!([{"title": "No time here"}]));
        let err = normalize_news("FEED", raw).unwrap_err();
        assert!(matches!(err, ProviderError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_all_blank_is_empty() {
        let raw = rows(json!([{"time": "10:00", "title": " "}]));
        let err = normalize_news("FEED", raw).unwrap_err();
        assert!(matches!(err, ProviderError::Empty { .. }));
    }
}
