//! Url helpers shared by the listing extractor and the search crawler.

use crate::error::ExtractError;
use url::Url;

/// Results per search page; also the step of the `start` offset parameter
pub const PAGE_SIZE: usize = 120;

/// Prefix `https://` unless the url already carries an http(s) scheme
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Listing id: the last path segment without its extension.
/// `https://seattle.craigslist.org/see/cto/d/bike/7001234567.html` -> `7001234567`
pub fn listing_id(url: &str) -> Result<String, ExtractError> {
    let invalid = || ExtractError::InvalidSourceId(url.to_string());

    let parsed = Url::parse(&normalize_url(url)).map_err(|_| invalid())?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .ok_or_else(invalid)?;

    match segment.split('.').next() {
        Some(stem) if !stem.is_empty() => Ok(stem.to_string()),
        _ => Err(invalid()),
    }
}

/// Search url for the zero-based `page`, replacing any existing `start`
pub fn page_url(search: &Url, page: usize) -> Url {
    let kept: Vec<(String, String)> = search
        .query_pairs()
        .filter(|(key, _)| key != "start")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = search.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("start", &(page * PAGE_SIZE).to_string());
    url
}

/// First dot-delimited segment of the host, e.g. `seattle`
pub fn host_locale(url: &Url) -> Option<&str> {
    url.host_str()
        .and_then(|host| host.split('.').next())
        .filter(|token| !token.is_empty())
}

/// Resolve a possibly relative link found on `page`
pub fn resolve_link(page: &Url, href: &str) -> Option<String> {
    page.join(href.trim()).ok().map(String::from)
}
