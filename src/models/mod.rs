use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordered `name -> value` facts from a listing's attribute group
pub type Attributes = IndexMap<String, Option<String>>;

/// Geolocation attached to a listing's map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Core listing data model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub source_url: String,
    pub title: String,
    /// Item category, only exposed by pages with more than one attribute group
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub image_urls: Vec<String>,
    pub body: String,
    pub attributes: Attributes,
    pub location: Option<Location>,
    pub posted_date: Option<DateTime<Utc>>,
    pub updated_date: Option<DateTime<Utc>>,
    pub scraped_at: DateTime<Utc>,
}
