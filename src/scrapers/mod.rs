pub mod listing;
pub mod loader;
pub mod search;
pub mod traits;
pub mod types;
pub mod urls;

#[cfg(test)]
pub(crate) mod fixtures;

use scraper::Selector;

/// Parse a selector literal used by the extractors
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

pub use listing::{extract, parse_listing};
pub use loader::HttpLoader;
pub use search::SearchCrawler;
pub use traits::DocumentLoader;
pub use types::CrawlOptions;
