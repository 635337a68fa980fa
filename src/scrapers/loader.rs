use crate::config::ClientConfig;
use crate::error::LoadError;
use crate::scrapers::traits::DocumentLoader;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Loads pages over HTTP with reqwest
pub struct HttpLoader {
    client: Client,
    timeout_secs: u64,
}

impl HttpLoader {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_duration())
            .user_agent(&config.user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            timeout_secs: config.timeout,
        })
    }
}

#[async_trait]
impl DocumentLoader for HttpLoader {
    async fn load(&self, url: &str) -> Result<String, LoadError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadError::Timeout(self.timeout_secs)
            } else {
                LoadError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(LoadError::Status(response.status().as_u16()));
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}

/// Run one loader call under `timeout`
pub async fn fetch(
    loader: &dyn DocumentLoader,
    url: &str,
    timeout: Duration,
) -> Result<String, LoadError> {
    tokio::time::timeout(timeout, loader.load(url))
        .await
        .map_err(|_| LoadError::Timeout(timeout.as_secs()))?
}
