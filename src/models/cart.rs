use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product held in a user's cart prior to checkout.
///
/// Stored at `carts/{userId}/{productId}`, so a product can appear at most
/// once per cart; repeat adds merge into the existing line. `quantity` is
/// never persisted below 1 and `discounted_price` is the snapshot of the
/// price the customer saw when the line was created or last refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub base_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub discounted_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<BTreeMap<String, String>>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

fn default_quantity() -> u32 {
    1
}
