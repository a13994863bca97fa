use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer review for a delivered order, stored at
/// `reviews/{orderId}/{userId}`.
///
/// One review per user per order; resubmission replaces the stored
/// document (edit). `images` holds URLs returned by the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductReview {
    pub order_id: String,
    pub rating: u8,
    pub review: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}
