//! HTML parsing for the search results page and listing detail pages.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::models::{DeliveryInfo, ListingRecord};

lazy_static! {
    static ref CARD: Selector = Selector::parse("div[data-cy='l-card']").unwrap();
    static ref LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref TITLE: Selector = Selector::parse("h4").unwrap();
    static ref PRICE: Selector = Selector::parse("p[data-testid='ad-price']").unwrap();
    static ref LOCATION: Selector = Selector::parse("p[data-testid='location-date']").unwrap();
    static ref IMAGE: Selector = Selector::parse("img").unwrap();
    static ref DELIVERY: Selector = Selector::parse("span.css-e0wl68").unwrap();
}

/// Parse every listing card on a search results page, in document order.
///
/// Cards without a link are skipped. An empty result usually means the site
/// changed its markup, so it is logged as a warning.
pub fn parse_search_page(html: &str, base_url: &str) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    let cards: Vec<ElementRef> = document.select(&CARD).collect();

    if cards.is_empty() {
        warn!(
            selector = "div[data-cy='l-card']",
            "No listing cards found; the page structure may have changed"
        );
        return Vec::new();
    }
    debug!(cards = cards.len(), "Found listing cards");

    cards
        .into_iter()
        .filter_map(|card| parse_card(card, base_url))
        .collect()
}

fn parse_card(card: ElementRef, base_url: &str) -> Option<ListingRecord> {
    let anchor = card.select(&LINK).next()?;
    let href = anchor.value().attr("href")?;
    let url = absolute_url(href, base_url);

    let title = first_text(card, &TITLE).unwrap_or_else(|| element_text(anchor));
    let image_url = card
        .select(&IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string);

    Some(
        ListingRecord::new(url, title)
            .with_price(first_text(card, &PRICE))
            .with_location(first_text(card, &LOCATION))
            .with_image_url(image_url),
    )
}

/// Inspect a detail page for the delivery indicator element.
pub fn parse_delivery_info(html: &str) -> DeliveryInfo {
    let document = Html::parse_document(html);
    match document.select(&DELIVERY).next() {
        Some(span) => DeliveryInfo::from_indicator(&element_text(span)),
        None => DeliveryInfo::Unavailable,
    }
}

/// Resolve a possibly relative listing href against the site base URL.
pub fn absolute_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base_url.trim_end_matches('/'), href),
    }
}

fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
