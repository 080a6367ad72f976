//! Shared HTTP plumbing for providers.
//!
//! Maps transport and status failures onto the `ProviderError` taxonomy so
//! every provider classifies failures the same way.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::ProviderError;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Client-side ceiling; the fetcher applies its own, usually shorter, timeout.
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin reqwest wrapper bound to one provider id.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
    provider: &'static str,
}

impl HttpFetcher {
    pub fn new(provider: &'static str) -> Self {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, provider }
    }

    /// GET a URL and return the body as text.
    pub async fn get_text(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ProviderError> {
        debug!("{} request: {} with {} params", self.provider, url, params.len());

        let response = self
            .client
            .get(url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited {
                provider: self.provider.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ProviderError::Unreachable {
                provider: self.provider.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(|e| self.classify(e))
    }

    /// GET a URL and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let body = self.get_text(url, params).await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::SchemaMismatch {
            provider: self.provider.to_string(),
            message: format!("Failed to parse response: {}", e),
        })
    }

    fn classify(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                provider: self.provider.to_string(),
            }
        } else if error.is_decode() {
            ProviderError::SchemaMismatch {
                provider: self.provider.to_string(),
                message: error.to_string(),
            }
        } else {
            ProviderError::Unreachable {
                provider: self.provider.to_string(),
                message: format!("Request failed: {}", error),
            }
        }
    }
}
