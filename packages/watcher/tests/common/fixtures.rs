//! Test fixtures for listings and search pages.

use watcher_core::listings::ListingRecord;

pub const SEARCH_URL: &str = "https://www.olx.pl/gdansk/q-iphone/";

/// A listing with every optional field filled in except the image
pub fn listing(id: &str, title: &str) -> ListingRecord {
    ListingRecord::new(format!("https://www.olx.pl/d/oferta/{}-{}.html", slug(title), id), title)
        .with_price(Some("1000 zł".to_string()))
        .with_location(Some("Gdańsk".to_string()))
}

pub fn listing_with_image(id: &str, title: &str, image_url: &str) -> ListingRecord {
    listing(id, title).with_image_url(Some(image_url.to_string()))
}

/// The `x-123.html` iPhone listing: no image, no delivery indicator
pub fn iphone_12() -> ListingRecord {
    ListingRecord::new("https://www.olx.pl/d/oferta/x-123.html", "iPhone 12")
        .with_price(Some("1000 zł".to_string()))
        .with_location(Some("Gdańsk".to_string()))
        .with_image_url(None)
}

fn slug(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
