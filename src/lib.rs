//! Structured data from Craigslist listings and search result pages.
//!
//! ```no_run
//! use listing_scout::{CrawlOptions, PostClient};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = PostClient::new()?;
//! let post = client
//!     .get_post("seattle.craigslist.org/see/bik/d/trek-fx-3/7001234567.html")
//!     .await?;
//! println!("{} ({:?})", post.title, post.price);
//!
//! let posts = client
//!     .get_posts_from_search("seattle.craigslist.org/search/bia", CrawlOptions::default())
//!     .await?;
//! println!("{} listings", posts.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod scrapers;

pub use client::PostClient;
pub use config::{ClientConfig, OnError};
pub use error::{ClientError, ClientResult, ErrorKind, ExtractError, LoadError, SearchError};
pub use models::{Attributes, Listing, Location};
pub use scrapers::{CrawlOptions, DocumentLoader};
