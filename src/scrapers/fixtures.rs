//! Markup and an in-memory loader shared by the scraper tests.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::LoadError;
use crate::scrapers::traits::DocumentLoader;
use async_trait::async_trait;

pub const LISTING_URL: &str = "https://seattle.craigslist.org/see/bik/d/trek-fx-3/7001234567.html";

/// A listing page carrying every optional region, including both gallery shapes
pub const FULL_LISTING: &str = r#"<!DOCTYPE html>
<html>
<head><title>Trek FX 3 hybrid bike - bicycles - by owner - bike sale</title></head>
<body class="posting">
<section class="body">
  <h1 class="postingtitle">
    <span class="postingtitletext">
      <span id="titletextonly">Trek FX 3 hybrid bike</span> - <span class="price">$1,250</span><small> (Capitol Hill)</small>
    </span>
  </h1>
  <p id="display-date" class="postinginfo reveal">Posted <time class="date timeago" datetime="2019-03-12T14:22:10-0700">2019-03-12 2:22pm</time></p>
  <section class="userbody">
    <figure class="iw multiimage">
      <div class="gallery">
        <div class="swipe"><div class="swipe-wrap">
          <div class="slide first visible"><img src="https://images.craigslist.org/slide_only_600x450.jpg" title="1" alt="1"></div>
        </div></div>
      </div>
      <div id="thumbs">
        <a id="1_thumb_a" class="thumb" href="https://images.craigslist.org/a_600x450.jpg"><img alt="1" src="https://images.craigslist.org/a_50x50c.jpg"></a>
        <a id="2_thumb_b" class="thumb" href="https://images.craigslist.org/b_600x450.jpg"><img alt="2" src="https://images.craigslist.org/b_50x50c.jpg"></a>
      </div>
    </figure>
    <div class="mapAndAttrs">
      <div class="mapbox">
        <div id="map" class="viewposting" data-latitude="47.615" data-longitude="-122.318" data-accuracy="10"></div>
        <div class="mapaddress">Pine St near 10th Ave</div>
      </div>
      <p class="attrgroup"><span><b>2019 Trek FX 3</b></span></p>
      <p class="attrgroup">
        <span>condition: <b>like new</b></span><br>
        <span>frame size: <b>M</b></span><br>
        <span>cash only</span><br>
      </p>
    </div>
    <section id="postingbody">
      <div class="print-information print-qrcode-container">
        <p class="print-qrcode-label">QR Code Link to This Post</p>
        <div class="print-qrcode"></div>
      </div>
Lightly used, garage kept.<br>
<br>
Call me at <a href="/reply" class="show-contact">show contact info</a>
    </section>
    <div class="postinginfos">
      <p class="postinginfo">post id: 7001234567</p>
      <p class="postinginfo reveal">posted: <time class="date timeago" datetime="2019-03-12T14:22:10-0700">2019-03-12 2:22pm</time></p>
      <p class="postinginfo reveal">updated: <time class="date timeago" datetime="2019-03-14T09:00:00-0700">2019-03-14 9:00am</time></p>
    </div>
  </section>
</section>
</body>
</html>"#;

/// The smallest page that still is a listing, with `extra` markup appended
pub fn listing_page(title: &str, extra: &str) -> String {
    format!(
        r#"<html><body>
<h1 class="postingtitle"><span class="postingtitletext"><span id="titletextonly">{title}</span></span></h1>
<section class="userbody">
{extra}
<section id="postingbody">Just a listing.</section>
</section>
</body></html>"#
    )
}

/// A search result index with an optional total count and gallery links
pub fn search_page(total: Option<usize>, links: &[&str]) -> String {
    let count = total
        .map(|total| format!(r#"<span class="totalcount">{total}</span>"#))
        .unwrap_or_default();
    let rows: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<li class="result-row"><a href="{link}" class="result-image gallery" data-ids="1:x"></a><a href="{link}" class="result-title hdrlnk">item</a></li>"#
            )
        })
        .collect();

    format!(
        r#"<html><body>
<div class="search-legend"><span class="rangeFrom">1</span>{count}</div>
<ul class="rows">{rows}</ul>
</body></html>"#
    )
}

/// Serves fixed pages by exact url and records every request
#[derive(Default)]
pub struct StaticLoader {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentLoader for StaticLoader {
    async fn load(&self, url: &str) -> Result<String, LoadError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(url.to_string()))
    }
}
