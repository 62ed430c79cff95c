//! Search results fetcher: reqwest for the page, `listings::parser` for the cards.

use async_trait::async_trait;
use tracing::info;

use super::http::fetch_html;
use super::BaseListingFetcher;
use crate::error::FetchError;
use crate::listings::{parse_search_page, ListingRecord};

pub struct OlxFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl OlxFetcher {
    /// `base_url` resolves relative listing links, e.g. `https://www.olx.pl`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BaseListingFetcher for OlxFetcher {
    async fn fetch_listings(&self, search_url: &str) -> Result<Vec<ListingRecord>, FetchError> {
        info!(url = %search_url, "Fetching listings");
        let html = fetch_html(&self.client, search_url).await?;
        let listings = parse_search_page(&html, &self.base_url);
        info!(count = listings.len(), "Finished fetching listings");
        Ok(listings)
    }
}
