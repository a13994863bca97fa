use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product saved for later, stored at `wishlist/{userId}/{productId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistEntry {
    pub product_id: String,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Decimal,
    pub added_at: DateTime<Utc>,
}
