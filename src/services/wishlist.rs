use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

use crate::{
    auth::{require_user, IdentityProvider},
    errors::CommerceError,
    events::{Event, EventSender},
    models::wishlist::WishlistEntry,
    services::pricing,
    store::{paths, DocumentStore},
};

/// Whether a toggle added or removed the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// Product snapshot captured when the customer taps the wishlist heart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveToWishlistInput {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub discount_percent: Option<Decimal>,
}

/// Saved-for-later products at `wishlist/{userId}/{productId}`.
#[derive(Clone)]
pub struct WishlistService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    event_sender: Arc<EventSender>,
}

impl WishlistService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            store,
            identity,
            event_sender,
        }
    }

    /// The user's wishlist in insertion order; empty when absent.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<WishlistEntry>, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let snapshot = self.store.read(&paths::wishlist(&user)).await?;

        let map = match snapshot {
            Some(Value::Object(map)) => map,
            _ => return Ok(Vec::new()),
        };

        let mut entries = map
            .into_iter()
            .map(|(_, doc)| serde_json::from_value(doc))
            .collect::<Result<Vec<WishlistEntry>, _>>()?;
        entries.sort_by(|a, b| a.added_at.cmp(&b.added_at));
        Ok(entries)
    }

    /// Adds the product, or removes it when already saved.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn toggle(
        &self,
        input: SaveToWishlistInput,
    ) -> Result<WishlistToggle, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let entry_path = paths::wishlist_entry(&user, &input.product_id);

        if self.store.read(&entry_path).await?.is_some() {
            self.store.remove(&entry_path).await?;
            self.event_sender
                .send_or_log(Event::WishlistRemoved {
                    user_id: user,
                    product_id: input.product_id,
                })
                .await;
            return Ok(WishlistToggle::Removed);
        }

        let entry = WishlistEntry {
            product_id: input.product_id.clone(),
            name: input.name,
            image: input.image,
            price: input.price.max(Decimal::ZERO),
            discounted_price: pricing::final_price(input.price, input.discount_percent),
            added_at: Utc::now(),
        };
        self.store
            .write(&entry_path, serde_json::to_value(&entry)?)
            .await?;

        self.event_sender
            .send_or_log(Event::WishlistAdded {
                user_id: user,
                product_id: input.product_id,
            })
            .await;
        Ok(WishlistToggle::Added)
    }

    /// Removes a saved product. Idempotent.
    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: &str) -> Result<(), CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        self.store
            .remove(&paths::wishlist_entry(&user, product_id))
            .await?;

        self.event_sender
            .send_or_log(Event::WishlistRemoved {
                user_id: user,
                product_id: product_id.to_string(),
            })
            .await;
        Ok(())
    }
}
