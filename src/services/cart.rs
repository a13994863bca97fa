use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use crate::{
    auth::{require_user, IdentityProvider},
    errors::CommerceError,
    events::{Event, EventSender},
    models::cart::CartLine,
    services::pricing,
    store::{paths, DocumentStore},
};

/// Shopping cart service scoped to the signed-in user.
///
/// Lines live at `carts/{userId}/{productId}` in the document store, so
/// the store itself enforces one line per product; repeat adds merge into
/// the existing line instead of appending a duplicate. Every operation
/// fails with `NotAuthenticated` when no user is signed in.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    event_sender: Arc<EventSender>,
}

impl CartService {
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

    /// Loads the user's cart in insertion order.
    ///
    /// Returns an empty list (not an error) when the user has no cart.
    #[instrument(skip(self))]
    pub async fn load_cart(&self) -> Result<Vec<CartLine>, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let snapshot = self.store.read(&paths::cart(&user)).await?;
        parse_cart_snapshot(snapshot)
    }

    /// Adds a product to the cart, merging with any existing line.
    ///
    /// On a repeat add the quantities accumulate and the price/variant
    /// snapshot refreshes to the latest product state; the original
    /// `added_at` is kept so the line does not jump around in the cart.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn add_line(&self, input: AddToCartInput) -> Result<CartLine, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let line_path = paths::cart_line(&user, &input.product_id);

        let existing: Option<CartLine> = match self.store.read(&line_path).await? {
            Some(doc) => Some(serde_json::from_value(doc)?),
            None => None,
        };

        let added = input.quantity.max(1);
        let (quantity, added_at) = match &existing {
            Some(current) => (current.quantity + added, current.added_at),
            None => (added, Utc::now()),
        };

        let line = CartLine {
            product_id: input.product_id,
            name: input.name,
            image: input.image,
            base_price: input.base_price.max(Decimal::ZERO),
            discount_percent: input.discount_percent,
            discounted_price: pricing::final_price(input.base_price, input.discount_percent),
            variant: input.variant,
            quantity,
            added_at,
        };

        self.store
            .write(&line_path, serde_json::to_value(&line)?)
            .await?;

        self.event_sender
            .send_or_log(Event::CartLineAdded {
                user_id: user.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            })
            .await;

        info!(user_id = %user, product_id = %line.product_id, quantity = line.quantity, "Cart line upserted");
        Ok(line)
    }

    /// Overwrites a line's quantity.
    ///
    /// Quantities below 1 are a no-op (a decrement at 1 never deletes the
    /// line; removal is explicit). Only the quantity field is touched, so
    /// the price snapshot is preserved.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        if quantity < 1 {
            return Ok(());
        }

        let line_path = paths::cart_line(&user, product_id);
        if self.store.read(&line_path).await?.is_none() {
            return Err(CommerceError::NotFound(format!(
                "cart line {} not found",
                product_id
            )));
        }

        let mut patch = serde_json::Map::new();
        patch.insert("quantity".to_string(), Value::from(quantity));
        self.store.update(&line_path, patch).await?;

        self.event_sender
            .send_or_log(Event::CartQuantityUpdated {
                user_id: user,
                product_id: product_id.to_string(),
                quantity,
            })
            .await;
        Ok(())
    }

    /// Removes a line. Idempotent: removing an absent line succeeds.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, product_id: &str) -> Result<(), CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        self.store
            .remove(&paths::cart_line(&user, product_id))
            .await?;

        self.event_sender
            .send_or_log(Event::CartLineRemoved {
                user_id: user,
                product_id: product_id.to_string(),
            })
            .await;
        Ok(())
    }

    /// Deletes the user's whole cart subtree.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        self.store.remove(&paths::cart(&user)).await?;

        self.event_sender
            .send_or_log(Event::CartCleared(user.clone()))
            .await;
        info!(user_id = %user, "Cart cleared");
        Ok(())
    }

    /// Subscribes to the live cart.
    ///
    /// The subscription is the rendering source of truth: optimistic local
    /// updates must reconcile against (never permanently override) each
    /// delivered snapshot. Decode items with [`parse_cart_snapshot`].
    pub fn subscribe(&self) -> Result<broadcast::Receiver<Option<Value>>, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        Ok(self.store.subscribe(&paths::cart(&user)))
    }
}

/// Decodes a cart snapshot (as stored or as delivered by a subscription)
/// into lines ordered by insertion time. `None` decodes as an empty cart.
pub fn parse_cart_snapshot(snapshot: Option<Value>) -> Result<Vec<CartLine>, CommerceError> {
    let map = match snapshot {
        Some(Value::Object(map)) => map,
        _ => return Ok(Vec::new()),
    };

    let mut lines = map
        .into_iter()
        .map(|(_, doc)| serde_json::from_value(doc))
        .collect::<Result<Vec<CartLine>, _>>()?;
    lines.sort_by(|a, b| a.added_at.cmp(&b.added_at));
    Ok(lines)
}

/// Product snapshot captured when the customer taps "add to cart".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddToCartInput {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub base_price: Decimal,
    pub discount_percent: Option<Decimal>,
    pub variant: Option<BTreeMap<String, String>>,
    pub quantity: u32,
}

impl AddToCartInput {
    /// Single-unit add with no variant selection, the common case from a
    /// product page.
    pub fn single(
        product_id: impl Into<String>,
        name: impl Into<String>,
        image: impl Into<String>,
        base_price: Decimal,
        discount_percent: Option<Decimal>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            image: image.into(),
            base_price,
            discount_percent,
            variant: None,
            quantity: 1,
        }
    }
}
