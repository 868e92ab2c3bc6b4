use crate::domain::ports::Fetcher;
use crate::utils::error::{Result, WatchError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent)
            .build()
            .map_err(|source| WatchError::FetchError {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_error = |source| WatchError::FetchError {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_error)?;
        tracing::debug!("Response status for {}: {}", url, response.status());

        if !response.status().is_success() {
            return Err(WatchError::BadStatusError {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(fetch_error)
    }
}
