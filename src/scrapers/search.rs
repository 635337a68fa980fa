//! Search crawl: walk the result pages of a search, then fetch every listing
//! they link to.

use std::sync::LazyLock;

use crate::config::{ClientConfig, OnError};
use crate::error::{ClientError, ClientResult, SearchError};
use crate::models::Listing;
use crate::scrapers::listing::fetch_listing;
use crate::scrapers::loader::fetch;
use crate::scrapers::selector;
use crate::scrapers::traits::DocumentLoader;
use crate::scrapers::types::CrawlOptions;
use crate::scrapers::urls::{
    host_locale, normalize_url, page_url, resolve_link, PAGE_SIZE,
};
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

static TOTAL_COUNT: LazyLock<Selector> = LazyLock::new(|| selector(".totalcount"));
static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.result-image.gallery[href]"));

/// What one result page yields
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    /// Raw text of the total count node, if the page has one
    pub total: Option<String>,
    /// Absolute listing urls in document order
    pub links: Vec<String>,
}

impl ResultPage {
    pub fn total_count(&self) -> Result<usize, SearchError> {
        let raw = self.total.as_deref().ok_or(SearchError::MissingTotalCount)?;
        raw.trim()
            .replace(',', "")
            .parse()
            .map_err(|_| SearchError::MalformedTotalCount(raw.to_string()))
    }
}

/// Crawl progress between result pages
#[derive(Debug, Clone)]
pub struct CrawlState {
    pub next_page: usize,
    pub planned_pages: usize,
    pub listings: Vec<Listing>,
}

impl CrawlState {
    pub fn new() -> Self {
        Self {
            next_page: 0,
            planned_pages: 1,
            listings: Vec::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.next_page >= self.planned_pages
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages needed to cover `total` results, never less than one
pub fn pages_for(total: usize) -> usize {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// Read the total count and listing links from a result page
pub fn parse_result_page(html: &str, page: &Url) -> Result<ResultPage, SearchError> {
    let document = Html::parse_document(html);

    let total = document
        .select(&TOTAL_COUNT)
        .next()
        .map(|node| node.text().collect::<String>());

    let links: Vec<String> = document
        .select(&RESULT_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_link(page, href))
        .collect();

    if links.is_empty() && total.is_none() {
        return Err(SearchError::NotAResultPage);
    }
    Ok(ResultPage { total, links })
}

/// Keep only links whose host starts with the `locale` label; no locale keeps everything
pub fn scope_filter(links: Vec<String>, locale: Option<&str>) -> Vec<String> {
    match locale {
        Some(locale) => links
            .into_iter()
            .filter(|link| {
                Url::parse(link)
                    .ok()
                    .is_some_and(|url| host_locale(&url).is_some_and(|l| l.eq_ignore_ascii_case(locale)))
            })
            .collect(),
        None => links,
    }
}

/// Crawler over one search url
pub struct SearchCrawler<'a> {
    loader: &'a dyn DocumentLoader,
    config: &'a ClientConfig,
    search: Url,
    options: CrawlOptions,
}

impl<'a> SearchCrawler<'a> {
    pub fn new(
        loader: &'a dyn DocumentLoader,
        config: &'a ClientConfig,
        search_url: &str,
        options: CrawlOptions,
    ) -> ClientResult<Self> {
        let normalized = normalize_url(search_url);
        let search = Url::parse(&normalized).map_err(|_| ClientError::InvalidSearch {
            url: normalized.clone(),
            source: SearchError::InvalidUrl(search_url.to_string()),
        })?;

        Ok(Self {
            loader,
            config,
            search,
            options,
        })
    }

    /// Run every planned page and return the accumulated listings
    pub async fn run(&self) -> ClientResult<Vec<Listing>> {
        let mut state = CrawlState::new();
        while !state.is_done() {
            state = self.step(state).await?;
        }

        info!("Crawl finished with {} listings", state.listings.len());
        Ok(state.listings)
    }

    /// Process the next result page of `state`
    pub async fn step(&self, state: CrawlState) -> ClientResult<CrawlState> {
        let page_url = page_url(&self.search, state.next_page);
        info!(
            "Fetching result page {}/{}: {}",
            state.next_page + 1,
            state.planned_pages,
            page_url
        );

        let html = fetch(self.loader, page_url.as_str(), self.config.timeout_duration())
            .await
            .map_err(|source| ClientError::Fetch {
                url: page_url.to_string(),
                source,
            })?;

        let page = parse_result_page(&html, &page_url).map_err(|source| self.invalid(source))?;

        let planned_pages = if state.next_page == 0 && self.options.load_all_pages {
            let total = page.total_count().map_err(|source| self.invalid(source))?;
            let pages = pages_for(total);
            info!("{} results across {} pages", total, pages);
            pages
        } else {
            state.planned_pages
        };

        let found = page.links.len();
        let locale = if self.options.local_only {
            host_locale(&self.search)
        } else {
            None
        };
        let links = scope_filter(page.links, locale);
        debug!("Keeping {} of {} result links", links.len(), found);

        let mut listings = state.listings;
        listings.extend(self.fetch_listings(&links).await?);

        Ok(CrawlState {
            next_page: state.next_page + 1,
            planned_pages,
            listings,
        })
    }

    /// Fetch `links` in order, up to `concurrency` at a time
    async fn fetch_listings(&self, links: &[String]) -> ClientResult<Vec<Listing>> {
        let total = links.len();
        let results = stream::iter(links)
            .map(|url| fetch_listing(self.loader, self.config, url))
            .buffered(self.config.concurrency.max(1))
            .enumerate();
        futures::pin_mut!(results);

        let mut listings = Vec::with_capacity(total);
        while let Some((i, result)) = results.next().await {
            info!("{}/{}", i + 1, total);
            match result {
                Ok(listing) => listings.push(listing),
                Err(e) if self.config.on_listing_error == OnError::SkipAndLog => {
                    warn!("Skipping {}: {}", e.url(), e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(listings)
    }

    fn invalid(&self, source: SearchError) -> ClientError {
        ClientError::InvalidSearch {
            url: self.search.to_string(),
            source,
        }
    }
}
