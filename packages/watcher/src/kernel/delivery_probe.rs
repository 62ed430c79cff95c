use async_trait::async_trait;
use tracing::{debug, warn};

use super::http::fetch_html;
use super::BaseEnrichmentProbe;
use crate::error::EnrichmentError;
use crate::listings::{parse_delivery_info, DeliveryInfo};

/// Fetches a listing's detail page and reads its delivery indicator.
pub struct HttpDeliveryProbe {
    client: reqwest::Client,
}

impl HttpDeliveryProbe {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_probe(&self, detail_url: &str) -> Result<DeliveryInfo, EnrichmentError> {
        let html = fetch_html(&self.client, detail_url).await?;
        Ok(parse_delivery_info(&html))
    }
}

#[async_trait]
impl BaseEnrichmentProbe for HttpDeliveryProbe {
    async fn probe(&self, detail_url: &str) -> DeliveryInfo {
        match self.try_probe(detail_url).await {
            Ok(info) => {
                debug!(url = %detail_url, delivery = %info, "Delivery info resolved");
                info
            }
            Err(e) => {
                warn!(url = %detail_url, error = %e, "Delivery check failed, assuming no shipping");
                DeliveryInfo::Unavailable
            }
        }
    }
}
