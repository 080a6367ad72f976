//! Sina Finance 7x24 news provider.
//!
//! Reads the Sina live feed. Items only carry `rich_text` and `create_time`;
//! the title is derived from the text during normalization.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{DataKind, DataRequest, RawRow};
use crate::provider::{DataProvider, HttpFetcher};

const BASE_URL: &str = "https://zhibo.sina.com.cn/api/zhibo/feed";
pub const PROVIDER_ID: &str = "SINA";

/// Global finance channel of the live feed.
const ZHIBO_ID: &str = "152";

#[derive(Debug, Deserialize)]
struct FeedResponse {
    result: FeedResult,
}

#[derive(Debug, Deserialize)]
struct FeedResult {
    status: FeedStatus,
    data: Option<FeedData>,
}

#[derive(Debug, Deserialize)]
struct FeedStatus {
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    feed: FeedList,
}

#[derive(Debug, Deserialize)]
struct FeedList {
    #[serde(default)]
    list: Vec<RawRow>,
}

/// Sina 7x24 live-feed provider.
pub struct SinaProvider {
    http: HttpFetcher,
}

impl SinaProvider {
    pub fn new() -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID),
        }
    }

    fn extract_rows(response: FeedResponse) -> Result<Vec<RawRow>, ProviderError> {
        let result = response.result;
        if result.status.code != 0 {
            return Err(ProviderError::Unreachable {
                provider: PROVIDER_ID.to_string(),
                message: format!("Feed status {}: {}", result.status.code, result.status.msg),
            });
        }

        let rows = result.data.map(|d| d.feed.list).unwrap_or_default();
        if rows.is_empty() {
            return Err(ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Ok(rows)
    }
}

impl Default for SinaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for SinaProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn kind(&self) -> DataKind {
        DataKind::News
    }

    async fn fetch(&self, _request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        let response: FeedResponse = self
            .http
            .get_json(
                BASE_URL,
                &[
                    ("page", "1"),
                    ("page_size", "50"),
                    ("zhibo_id", ZHIBO_ID),
                    ("tag_id", "0"),
                    ("dire", "f"),
                    ("dpc", "1"),
                ],
            )
            .await?;

        let rows = Self::extract_rows(response)?;
        debug!("Sina returned {} news items", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_rows() {
        let json = r#"{"result": {"status": {"code": 0, "msg": ""}, "data": {"feed": {"list": [
            {"id": 1, "rich_text": "Gold hits record high", "create_time": "2024-05-01 10:00:00"}
        ]}}}}"#;
        let response: FeedResponse = serde_json::from_str(json).unwrap();
        let rows = SinaProvider::extract_rows(response).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["rich_text"], "Gold hits record high");
    }

    #[test]
    fn test_error_status_is_unreachable() {
        let json = r#"{"result": {"status": {"code": 11, "msg": "busy"}}}"#;
        let response: FeedResponse = serde_json::from_str(json).unwrap();
        let err = SinaProvider::extract_rows(response).unwrap_err();
        assert!(matches!(err, ProviderError::Unreachable { .. }));
    }
}
