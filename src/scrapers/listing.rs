//! Listing extraction.
//!
//! Every field is an independent lookup against the parsed page. Optional
//! regions that are absent leave their field empty; only the title, the
//! body, and values that are present but fail to parse abort the extraction.

use std::str::FromStr;
use std::sync::LazyLock;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, ExtractError};
use crate::models::{Attributes, Listing, Location};
use crate::scrapers::loader::fetch;
use crate::scrapers::traits::DocumentLoader;
use crate::scrapers::selector;
use crate::scrapers::urls::{listing_id, normalize_url};
use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Footer line appended to every posting body
pub const QR_FOOTER: &str = "QR Code Link to This Post";
/// Placeholder for a phone number hidden behind a reveal button
pub const CONTACT_PHRASE: &str = "show contact info";
pub const CONTACT_REDACTED: &str = "[CONTACT INFO REMOVED]";

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("#titletextonly"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector(".price"));
static THUMBS: LazyLock<Selector> = LazyLock::new(|| selector("#thumbs"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static FIRST_SLIDE: LazyLock<Selector> = LazyLock::new(|| selector("div.slide.first.visible"));
static IMAGE: LazyLock<Selector> = LazyLock::new(|| selector("img[src]"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("#postingbody"));
static TIME: LazyLock<Selector> = LazyLock::new(|| selector("time"));
static ATTR_GROUP: LazyLock<Selector> = LazyLock::new(|| selector(".attrgroup"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static BOLD: LazyLock<Selector> = LazyLock::new(|| selector("b"));
static MAP: LazyLock<Selector> = LazyLock::new(|| selector("#map"));
static MAP_ADDRESS: LazyLock<Selector> = LazyLock::new(|| selector(".mapaddress"));
static SMALL: LazyLock<Selector> = LazyLock::new(|| selector("small"));

/// `$1,250.00`, `-$5`, `($5)`: optional sign, optional `$`, comma grouped digits, optional fraction
static CURRENCY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-)?\s*\$?\s*(-)?(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?$")
        .expect("static pattern is valid")
});

type ImageStrategy = fn(&Html) -> Option<Vec<String>>;

/// Image sources in priority order; the first one that finds anything wins
const IMAGE_STRATEGIES: [(&str, ImageStrategy); 2] = [
    ("thumbnail strip", thumbnail_strip as ImageStrategy),
    ("first slide", first_slide as ImageStrategy),
];

/// Fetch `url` through `loader` and extract its listing.
/// The url is checked for a listing id before anything is fetched.
pub async fn fetch_listing(
    loader: &dyn DocumentLoader,
    config: &ClientConfig,
    url: &str,
) -> ClientResult<Listing> {
    listing_id(url).map_err(|source| ClientError::from_extract(url, source))?;
    let url = normalize_url(url);

    let html = fetch(loader, &url, config.timeout_duration())
        .await
        .map_err(|source| ClientError::Fetch {
            url: url.clone(),
            source,
        })?;

    parse_listing(&html, &url).map_err(|source| ClientError::from_extract(url, source))
}

/// Parse `html` and extract the listing it describes
pub fn parse_listing(html: &str, source_url: &str) -> Result<Listing, ExtractError> {
    let document = Html::parse_document(html);
    extract(&document, source_url)
}

/// Map a fetched listing page onto a [`Listing`]
pub fn extract(document: &Html, source_url: &str) -> Result<Listing, ExtractError> {
    let id = listing_id(source_url)?;
    let source_url = normalize_url(source_url);

    let title = document
        .select(&TITLE)
        .next()
        .map(inner_text)
        .ok_or(ExtractError::MissingNode("title"))?;

    let price = document
        .select(&PRICE)
        .next()
        .map(|node| parse_price(&node.text().collect::<String>()))
        .transpose()?;

    let image_urls = images(document);

    let body = document
        .select(&BODY)
        .next()
        .map(|node| clean_body(&node.text().collect::<String>()))
        .ok_or(ExtractError::MissingNode("body"))?;

    let (posted_date, updated_date) = timestamps(document)?;
    let (category, attributes) = attribute_groups(document);
    let location = location(document)?;

    debug!(
        "Extracted listing {}: {} images, {} attributes, location: {}",
        id,
        image_urls.len(),
        attributes.len(),
        location.is_some()
    );

    Ok(Listing {
        id,
        source_url,
        title,
        category,
        price,
        image_urls,
        body,
        attributes,
        location,
        posted_date,
        updated_date,
        scraped_at: Utc::now(),
    })
}

fn inner_text(node: ElementRef) -> String {
    node.text().collect::<String>().trim().to_string()
}

/// Parse a currency amount such as `$1,250` or `$ 79.99`.
/// Anything beyond sign, symbol, grouped digits and fraction is rejected.
pub fn parse_price(text: &str) -> Result<Decimal, ExtractError> {
    let malformed = || ExtractError::malformed("price", text.trim());

    let trimmed = text.trim();
    let (inner, parenthesized) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    };

    let caps = CURRENCY.captures(inner).ok_or_else(malformed)?;
    let signs = [caps.get(1), caps.get(2)].iter().flatten().count() + usize::from(parenthesized);
    if signs > 1 {
        return Err(malformed());
    }

    let digits = caps[3].replace(',', "");
    let fraction = caps.get(4).map_or("", |m| m.as_str());
    let amount = Decimal::from_str(&format!("{digits}{fraction}")).map_err(|_| malformed())?;
    Ok(if signs == 1 { -amount } else { amount })
}

fn images(document: &Html) -> Vec<String> {
    IMAGE_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let urls = strategy(document)?;
            debug!("Found {} images via {}", urls.len(), name);
            Some(urls)
        })
        .unwrap_or_default()
}

fn thumbnail_strip(document: &Html) -> Option<Vec<String>> {
    let thumbs = document.select(&THUMBS).next()?;
    let urls: Vec<String> = thumbs
        .select(&LINK)
        .filter_map(|a| a.value().attr("href"))
        .map(String::from)
        .collect();

    (!urls.is_empty()).then_some(urls)
}

fn first_slide(document: &Html) -> Option<Vec<String>> {
    let slide = document.select(&FIRST_SLIDE).next()?;
    let src = slide.select(&IMAGE).next()?.value().attr("src")?;
    Some(vec![src.to_string()])
}

/// Drop blank and footer lines, redact contact placeholders, and join the
/// remaining lines as paragraphs.
pub fn clean_body(raw: &str) -> String {
    raw.split('\n')
        .filter(|line| !line.trim().is_empty() && !line.contains(QR_FOOTER))
        .map(|line| line.trim().replace(CONTACT_PHRASE, CONTACT_REDACTED))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Posted date is the first time node. Some variants embed a second time
/// node elsewhere, so an update is only reported when there are three or more.
fn timestamps(
    document: &Html,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), ExtractError> {
    let times: Vec<ElementRef> = document.select(&TIME).collect();

    let posted = times.first().map(|t| parse_time(*t)).transpose()?;
    let updated = if times.len() >= 3 {
        times.last().map(|t| parse_time(*t)).transpose()?
    } else {
        None
    };
    Ok((posted, updated))
}

fn parse_time(node: ElementRef) -> Result<DateTime<Utc>, ExtractError> {
    let raw = node
        .value()
        .attr("datetime")
        .ok_or_else(|| ExtractError::malformed("datetime", inner_text(node)))?
        .trim();

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ExtractError::malformed("datetime", raw))
}

/// Category from the first group when there are several, attributes from the last
fn attribute_groups(document: &Html) -> (Option<String>, Attributes) {
    let groups: Vec<ElementRef> = document.select(&ATTR_GROUP).collect();

    let category = if groups.len() > 1 {
        groups
            .first()
            .and_then(|group| group.select(&BOLD).next())
            .map(inner_text)
    } else {
        None
    };

    let mut attributes = Attributes::new();
    if let Some(group) = groups.last() {
        for span in group.select(&SPAN) {
            let text = inner_text(span);
            let key = text.split(':').next().unwrap_or_default().trim();
            if key.is_empty() {
                continue;
            }
            let value = span.select(&BOLD).next().map(inner_text);
            attributes.entry(key.to_string()).or_insert(value);
        }
    }

    (category, attributes)
}

fn location(document: &Html) -> Result<Option<Location>, ExtractError> {
    let Some(map) = document.select(&MAP).next() else {
        return Ok(None);
    };

    let latitude = coordinate(map, "data-latitude")?;
    let longitude = coordinate(map, "data-longitude")?;

    let name = document
        .select(&SMALL)
        .next()
        .map(|small| {
            inner_text(small)
                .replace(|c: char| c == '(' || c == ')', "")
                .trim()
                .to_string()
        })
        .filter(|name| !name.is_empty());

    let address = document
        .select(&MAP_ADDRESS)
        .next()
        .map(inner_text)
        .filter(|address| !address.is_empty());

    Ok(Some(Location {
        name,
        address,
        latitude,
        longitude,
    }))
}

fn coordinate(map: ElementRef, attr: &'static str) -> Result<f64, ExtractError> {
    let raw = map
        .value()
        .attr(attr)
        .ok_or_else(|| ExtractError::malformed(attr, ""))?;
    raw.trim()
        .parse()
        .map_err(|_| ExtractError::malformed(attr, raw))
}
