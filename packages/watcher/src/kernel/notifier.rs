//! Listing notifications on top of a chat transport.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use super::{BaseMessenger, BaseNotifier};
use crate::error::NotificationError;
use crate::listings::{DeliveryInfo, ListingRecord};

/// Characters MarkdownV2 treats as markup anywhere outside code spans.
const MARKDOWN_V2_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape scraped text so Telegram renders it literally.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render the MarkdownV2 caption: title (bold), price, location, delivery, URL.
pub fn render_caption(listing: &ListingRecord) -> String {
    let delivery = listing
        .delivery
        .clone()
        .unwrap_or(DeliveryInfo::Unavailable);
    format!(
        "📌 *{}*\n💰 {}\n📍 {}\n🚚 {}\n🔗 {}",
        escape_markdown(&listing.title),
        escape_markdown(&listing.price),
        escape_markdown(&listing.location),
        escape_markdown(&delivery.to_string()),
        escape_markdown(&listing.url)
    )
}

/// Sends listings as photo-with-caption, falling back to text when the photo is rejected.
pub struct MessengerNotifier {
    messenger: Arc<dyn BaseMessenger>,
}

impl MessengerNotifier {
    pub fn new(messenger: Arc<dyn BaseMessenger>) -> Self {
        Self { messenger }
    }
}

#[async_trait]
impl BaseNotifier for MessengerNotifier {
    async fn notify(&self, listing: &ListingRecord) -> Result<(), NotificationError> {
        let caption = render_caption(listing);

        if let Some(image_url) = listing.image_url.as_deref() {
            match self.messenger.send_photo(image_url, &caption).await {
                Ok(()) => {
                    info!(listing_id = %listing.id, "Sent photo notification");
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        listing_id = %listing.id,
                        image_url = %image_url,
                        error = %e,
                        "Photo delivery failed, falling back to text"
                    );
                }
            }
        }

        self.messenger.send_text(&caption).await?;
        info!(listing_id = %listing.id, "Sent text notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::{MessengerCall, MockMessenger};

    fn listing() -> ListingRecord {
        ListingRecord::new("https://www.olx.pl/d/oferta/iphone-12-CID99-ID1.html", "iPhone 12")
            .with_price(Some("1000 zł".into()))
            .with_location(Some("Gdańsk".into()))
    }

    #[test]
    fn test_render_caption_lines() {
        let caption = render_caption(&listing().with_delivery(DeliveryInfo::Unavailable));
        let lines: Vec<&str> = caption.lines().collect();
        assert_eq!(
            lines,
            vec![
                "📌 *iPhone 12*",
                "💰 1000 zł",
                "📍 Gdańsk",
                "🚚 Brak przesyłki OLX",
                r"🔗 https://www\.olx\.pl/d/oferta/iphone\-12\-CID99\-ID1\.html",
            ]
        );
    }

    #[test]
    fn test_caption_escapes_markup_in_scraped_fields() {
        let listing = ListingRecord::new(
            "https://www.olx.pl/d/oferta/etui-CID99-ID7.html?reason=extended_search",
            "Etui_iPhone *nowe* [12]",
        )
        .with_price(Some("1 000 zł (do negocjacji)".into()))
        .with_location(Some("Gdańsk_Wrzeszcz".into()))
        .with_delivery(DeliveryInfo::from_indicator("Pakiet Ochronny"));

        let lines: Vec<String> = render_caption(&listing).lines().map(String::from).collect();

        assert_eq!(lines[0], r"📌 *Etui\_iPhone \*nowe\* \[12\]*");
        assert_eq!(lines[1], r"💰 1 000 zł \(do negocjacji\)");
        assert_eq!(lines[2], r"📍 Gdańsk\_Wrzeszcz");
        assert_eq!(lines[3], r"🚚 Dostępna przesyłka OLX \(Pakiet Ochronny\)");
        assert_eq!(
            lines[4],
            r"🔗 https://www\.olx\.pl/d/oferta/etui\-CID99\-ID7\.html?reason\=extended\_search"
        );
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("a_b*c"), r"a\_b\*c");
        assert_eq!(escape_markdown(r"back\slash"), r"back\\slash");
        assert_eq!(escape_markdown("zł 100"), "zł 100");
    }

    #[tokio::test]
    async fn test_text_only_without_image() {
        let messenger = Arc::new(MockMessenger::new());
        let notifier = MessengerNotifier::new(messenger.clone());

        notifier.notify(&listing()).await.unwrap();

        let calls = messenger.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], MessengerCall::Text { .. }));
    }

    #[tokio::test]
    async fn test_photo_when_image_present() {
        let messenger = Arc::new(MockMessenger::new());
        let notifier = MessengerNotifier::new(messenger.clone());

        notifier
            .notify(&listing().with_image_url(Some("https://img.example/1.jpg".into())))
            .await
            .unwrap();

        assert_eq!(messenger.photo_count(), 1);
        assert_eq!(messenger.text_count(), 0);
    }

    #[tokio::test]
    async fn test_photo_failure_falls_back_to_text() {
        let messenger = Arc::new(MockMessenger::new().failing_photos());
        let notifier = MessengerNotifier::new(messenger.clone());
        let listing = listing().with_image_url(Some("https://img.example/broken.webp".into()));

        notifier.notify(&listing).await.unwrap();

        assert_eq!(messenger.text_count(), 1);
        let texts = messenger.delivered_texts();
        assert_eq!(texts[0], render_caption(&listing));
    }

    #[tokio::test]
    async fn test_total_failure_is_reported() {
        let messenger = Arc::new(MockMessenger::new().failing_photos().failing_texts());
        let notifier = MessengerNotifier::new(messenger.clone());

        let result = notifier
            .notify(&listing().with_image_url(Some("https://img.example/1.jpg".into())))
            .await;

        assert!(result.is_err());
        assert_eq!(messenger.delivered_texts().len(), 0);
    }
}
