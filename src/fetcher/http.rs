use crate::fetcher::traits::{RawResponse, Transport};
use crate::model::FetchError;

use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use std::time::Duration;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) CoinEmaSniper/0.1")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network { cause: e.to_string() })?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network { cause: e.to_string() })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network { cause: e.to_string() })?;

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            retry_after,
            body,
        })
    }
}
