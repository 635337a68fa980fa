use listing_scout::{ClientConfig, CrawlOptions, PostClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_SEARCH: &str = "seattle.craigslist.org/search/bia";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    info!("Listing Scout - Craigslist search crawler");

    let config = ClientConfig::from_env()?;
    let search_url = std::env::var("SCOUT_SEARCH_URL").unwrap_or_else(|_| DEFAULT_SEARCH.to_string());
    let options = CrawlOptions {
        load_all_pages: std::env::var("SCOUT_LOAD_ALL_PAGES").is_ok_and(|v| v == "1" || v == "true"),
        ..CrawlOptions::default()
    };

    let client = PostClient::with_config(config)?;

    info!("Starting crawl of {}", search_url);
    let listings = client.get_posts_from_search(&search_url, options).await?;

    info!("Scraped {} listings", listings.len());
    for (i, listing) in listings.iter().enumerate() {
        info!(
            "{}. {} ({})",
            i + 1,
            listing.title,
            listing
                .price
                .map(|p| format!("${}", p))
                .unwrap_or_else(|| "no price".to_string())
        );
    }

    println!("{}", serde_json::to_string_pretty(&listings)?);

    Ok(())
}
