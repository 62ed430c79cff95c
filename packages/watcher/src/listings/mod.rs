pub mod models;
pub mod parser;

pub use models::{listing_id_from_url, DeliveryInfo, ListingRecord, SeenRecord};
pub use parser::{parse_delivery_info, parse_search_page};
