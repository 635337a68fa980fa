use std::io;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::Listing;
use crate::scrapers::listing::fetch_listing;
use crate::scrapers::{CrawlOptions, DocumentLoader, HttpLoader, SearchCrawler};
use anyhow::Result;
use std::future::Future;
use tracing::info;

/// Entry point for fetching single listings and crawling searches
#[derive(Clone)]
pub struct PostClient {
    loader: Arc<dyn DocumentLoader>,
    config: ClientConfig,
}

impl PostClient {
    /// Create a client over HTTP with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let loader = HttpLoader::new(&config)?;
        Ok(Self::with_loader(loader, config))
    }

    /// Create a client that fetches pages through `loader`
    pub fn with_loader(loader: impl DocumentLoader + 'static, config: ClientConfig) -> Self {
        Self {
            loader: Arc::new(loader),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch and extract the listing at `url`
    pub async fn get_post(&self, url: &str) -> ClientResult<Listing> {
        info!("Fetching listing {}", url);
        fetch_listing(self.loader.as_ref(), &self.config, url).await
    }

    /// Crawl the search at `search_url` and extract every listing it links to
    pub async fn get_posts_from_search(
        &self,
        search_url: &str,
        options: CrawlOptions,
    ) -> ClientResult<Vec<Listing>> {
        info!("Crawling search {} ({:?})", search_url, options);
        SearchCrawler::new(self.loader.as_ref(), &self.config, search_url, options)?
            .run()
            .await
    }

    /// Blocking [`get_post`](Self::get_post). Fails when called from inside an async runtime.
    pub fn get_post_blocking(&self, url: &str) -> ClientResult<Listing> {
        block_on(self.get_post(url))?
    }

    /// Blocking [`get_posts_from_search`](Self::get_posts_from_search)
    pub fn get_posts_from_search_blocking(
        &self,
        search_url: &str,
        options: CrawlOptions,
    ) -> ClientResult<Vec<Listing>> {
        block_on(self.get_posts_from_search(search_url, options))?
    }
}

fn block_on<F: Future>(future: F) -> ClientResult<F::Output> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ClientError::Runtime(io::Error::other(
            "blocking call made from inside an async runtime",
        )));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(ClientError::Runtime)?;
    Ok(runtime.block_on(future))
}
