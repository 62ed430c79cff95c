use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

pub const NO_PRICE: &str = "Brak ceny";
pub const NO_LOCATION: &str = "Brak lokalizacji";

/// Phrases that mark the site's own shipping programme.
pub const OLX_DELIVERY_MARKERS: [&str; 3] = ["Pakiet Ochronny", "Dostępna przesyłka", "Przesyłka OLX"];

/// Shipping availability derived from a listing's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryInfo {
    /// Protected-package shipping, with the raw indicator text.
    OlxDelivery(String),
    /// Indicator present but with some other wording.
    Other(String),
    Unavailable,
}

impl DeliveryInfo {
    /// Classify the text of the delivery indicator element.
    pub fn from_indicator(text: &str) -> Self {
        let text = text.trim();
        if OLX_DELIVERY_MARKERS.iter().any(|m| text.contains(m)) {
            DeliveryInfo::OlxDelivery(text.to_string())
        } else {
            DeliveryInfo::Other(text.to_string())
        }
    }
}

impl fmt::Display for DeliveryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryInfo::OlxDelivery(text) => write!(f, "Dostępna przesyłka OLX ({})", text),
            DeliveryInfo::Other(text) => write!(f, "Inna informacja o przesyłce: {}", text),
            DeliveryInfo::Unavailable => write!(f, "Brak przesyłki OLX"),
        }
    }
}

/// One listing scraped from the search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub price: String,
    pub location: String,
    pub image_url: Option<String>,
    pub delivery: Option<DeliveryInfo>,
}

impl ListingRecord {
    /// Create a listing from its absolute URL. The identifier is derived from the URL.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            id: listing_id_from_url(&url),
            title: title.into(),
            url,
            price: NO_PRICE.to_string(),
            location: NO_LOCATION.to_string(),
            image_url: None,
            delivery: None,
        }
    }

    pub fn with_price(mut self, price: Option<String>) -> Self {
        self.price = non_empty(price).unwrap_or_else(|| NO_PRICE.to_string());
        self
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = non_empty(location).unwrap_or_else(|| NO_LOCATION.to_string());
        self
    }

    /// Protocol-relative URLs become `https:`; blank values are dropped.
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = non_empty(image_url).map(|src| {
            if src.starts_with("//") {
                format!("https:{}", src)
            } else {
                src
            }
        });
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryInfo) -> Self {
        self.delivery = Some(delivery);
        self
    }
}

/// Persisted proof that a listing was notified.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct SeenRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    /// Seconds since epoch of the first notification
    pub ts: i64,
}

impl SeenRecord {
    pub fn from_listing(listing: &ListingRecord, ts: i64) -> Self {
        Self {
            id: listing.id.clone(),
            url: listing.url.clone(),
            title: listing.title.clone(),
            ts,
        }
    }
}

/// Derive the stable listing identifier from its canonical URL.
///
/// Listing URLs end in `<slug>-<id>.html`; the identifier is the part after
/// the last `-` with the extension removed. Query strings and fragments are
/// ignored so tracking parameters do not change the identifier.
pub fn listing_id_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.trim_end_matches('/');
    let last_segment = path.rsplit('/').next().unwrap_or(path);
    let tail = last_segment.rsplit('-').next().unwrap_or(last_segment);
    tail.trim_end_matches(".html").to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_from_url() {
        assert_eq!(
            listing_id_from_url("https://www.olx.pl/d/oferta/iphone-12-CID99-IDabc12.html"),
            "IDabc12"
        );
        assert_eq!(listing_id_from_url("https://www.olx.pl/d/oferta/x-123.html"), "123");
        assert_eq!(
            listing_id_from_url("https://www.olx.pl/d/oferta/x-123.html?reason=extended_search"),
            "123"
        );
        assert_eq!(listing_id_from_url("https://www.olx.pl/d/oferta/plain.html"), "plain");
    }

    #[test]
    fn test_identifier_ignores_title_and_price() {
        let url = "https://www.olx.pl/d/oferta/iphone-12-CID99-ID1.html";
        let before = ListingRecord::new(url, "iPhone 12").with_price(Some("1000 zł".into()));
        let after = ListingRecord::new(url, "iPhone 12 OKAZJA").with_price(Some("900 zł".into()));
        assert_eq!(before.id, after.id);
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let listing = ListingRecord::new("https://www.olx.pl/d/oferta/x-1.html", "x")
            .with_price(None)
            .with_location(Some("   ".into()));
        assert_eq!(listing.price, NO_PRICE);
        assert_eq!(listing.location, NO_LOCATION);
        assert!(listing.delivery.is_none());
    }

    #[test]
    fn test_image_url_normalization() {
        let base = ListingRecord::new("https://www.olx.pl/d/oferta/x-1.html", "x");
        assert_eq!(
            base.clone()
                .with_image_url(Some("//ireland.apollo.olxcdn.com/v1/files/a.jpg".into()))
                .image_url
                .as_deref(),
            Some("https://ireland.apollo.olxcdn.com/v1/files/a.jpg")
        );
        assert_eq!(base.clone().with_image_url(Some("".into())).image_url, None);
        assert_eq!(base.with_image_url(None).image_url, None);
    }

    #[test]
    fn test_delivery_classification() {
        assert_eq!(
            DeliveryInfo::from_indicator("Pakiet Ochronny OLX").to_string(),
            "Dostępna przesyłka OLX (Pakiet Ochronny OLX)"
        );
        assert_eq!(
            DeliveryInfo::from_indicator("Odbiór osobisty").to_string(),
            "Inna informacja o przesyłce: Odbiór osobisty"
        );
        assert_eq!(DeliveryInfo::Unavailable.to_string(), "Brak przesyłki OLX");
    }
}
