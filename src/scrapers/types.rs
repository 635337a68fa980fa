use serde::{Deserialize, Serialize};

/// Options for crawling a search result index
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Follow every result page instead of only the first
    pub load_all_pages: bool,
    /// Keep only listings on the search url's regional subdomain
    pub local_only: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            load_all_pages: false,
            local_only: true,
        }
    }
}
