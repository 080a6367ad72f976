//! Eastmoney 7x24 news provider.
//!
//! Reads the Eastmoney fast-news list, a rolling feed of short market
//! headlines. Items carry `title`, `summary` and `showTime` fields.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::errors::ProviderError;
use crate::models::{DataKind, DataRequest, RawRow};
use crate::provider::{DataProvider, HttpFetcher};

const BASE_URL: &str = "https://np-weblist.eastmoney.com/comm/web/getFastNewsList";
pub const PROVIDER_ID: &str = "EASTMONEY";
const PAGE_SIZE: &str = "50";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct FastNewsResponse {
    data: Option<FastNewsData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FastNewsData {
    #[serde(default)]
    fast_news_list: Vec<RawRow>,
}

// ============================================================================
// EastmoneyProvider
// ============================================================================

/// Eastmoney 7x24 fast-news provider.
pub struct EastmoneyProvider {
    http: HttpFetcher,
}

impl EastmoneyProvider {
    pub fn new() -> Self {
        Self {
            http: HttpFetcher::new(PROVIDER_ID),
        }
    }

    fn extract_rows(response: FastNewsResponse) -> Result<Vec<RawRow>, ProviderError> {
        let data = response.data.ok_or_else(|| ProviderError::SchemaMismatch {
            provider: PROVIDER_ID.to_string(),
            message: "Response has no data object".to_string(),
        })?;

        if data.fast_news_list.is_empty() {
            return Err(ProviderError::Empty {
                provider: PROVIDER_ID.to_string(),
            });
        }

        Ok(data.fast_news_list)
    }
}

impl Default for EastmoneyProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataProvider for EastmoneyProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn kind(&self) -> DataKind {
        DataKind::News
    }

    async fn fetch(&self, request: &DataRequest) -> Result<Vec<RawRow>, ProviderError> {
        let trace = request.requested_at.timestamp_millis().to_string();

        let response: FastNewsResponse = self
            .http
            .get_json(
                BASE_URL,
                &[
                    ("client", "web"),
                    ("biz", "web_724"),
                    ("fastColumn", "102"),
                    ("sortEnd", ""),
                    ("pageSize", PAGE_SIZE),
                    ("req_trace", trace.as_str()),
                ],
            )
            .await?;

        let rows = Self::extract_rows(response)?;
        debug!("Eastmoney returned {} news items", rows.len());
        Ok(rows)
    }
}
