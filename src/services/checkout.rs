use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    auth::{require_user, IdentityProvider, UserId},
    config::AppConfig,
    errors::CommerceError,
    events::{Event, EventSender},
    models::{
        address::ShippingAddress,
        cart::CartLine,
        order::{Order, OrderStatus, PaymentMode},
    },
    payments::{HostedCheckout, MethodFlags, PaymentOutcome, PaymentPrefill, PaymentRequest},
    services::{cart::CartService, pricing, wallet::WalletService},
    store::{paths, DocumentStore},
};

/// Message shown when pay-later is attempted below the policy threshold.
fn bnpl_threshold_message(minimum: Decimal) -> String {
    format!("Pay Later is available for orders of {} or more", minimum)
}

/// Resolution of a hosted-settlement checkout attempt.
///
/// `Abandoned` means the user closed the payment widget without
/// confirming: nothing durable was written and the attempt is editable
/// again.
#[derive(Debug)]
pub enum CheckoutOutcome {
    Placed(Order),
    Abandoned,
}

/// Order placement workflow.
///
/// One attempt proceeds: collect items + shipping, validate, settle, then
/// write exactly one order record. Cash on delivery settles immediately
/// with status `Pending`. Online and pay-later settlements first await the
/// hosted widget's confirmation — the confirmation is the only trigger
/// that creates the order (status `Paid`), followed by the reward-coin
/// credit and cart clearing, in that order, all before success is
/// reported. A failed collaborator write surfaces as an error and leaves
/// the attempt at the step before the write.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    widget: Arc<dyn HostedCheckout>,
    cart: Arc<CartService>,
    wallet: Arc<WalletService>,
    event_sender: Arc<EventSender>,
    config: Arc<AppConfig>,
}

impl CheckoutService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        widget: Arc<dyn HostedCheckout>,
        cart: Arc<CartService>,
        wallet: Arc<WalletService>,
        event_sender: Arc<EventSender>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            identity,
            widget,
            cart,
            wallet,
            event_sender,
            config,
        }
    }

    /// Places a cash-on-delivery order (status `Pending`, no wallet
    /// credit).
    #[instrument(skip(self, items, shipping), fields(lines = items.len()))]
    pub async fn checkout_cod(
        &self,
        items: Vec<CartLine>,
        shipping: &ShippingAddress,
    ) -> Result<Order, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let total = validate_attempt(&items, shipping)?;
        self.create_order(&user, items, total, shipping, PaymentMode::Cod)
            .await
    }

    /// Runs an immediate online settlement through the hosted widget.
    #[instrument(skip(self, items, shipping, email), fields(lines = items.len()))]
    pub async fn checkout_online(
        &self,
        items: Vec<CartLine>,
        shipping: &ShippingAddress,
        email: Option<String>,
    ) -> Result<CheckoutOutcome, CommerceError> {
        self.settle_hosted(items, shipping, email, PaymentMode::Online)
            .await
    }

    /// Runs a deferred (pay-later) settlement through the hosted widget.
    ///
    /// Only offerable when the cart total reaches the configured minimum;
    /// below it the attempt fails locally without contacting any
    /// collaborator.
    #[instrument(skip(self, items, shipping, email), fields(lines = items.len()))]
    pub async fn checkout_pay_later(
        &self,
        items: Vec<CartLine>,
        shipping: &ShippingAddress,
        email: Option<String>,
    ) -> Result<CheckoutOutcome, CommerceError> {
        self.settle_hosted(items, shipping, email, PaymentMode::Bnpl)
            .await
    }

    async fn settle_hosted(
        &self,
        items: Vec<CartLine>,
        shipping: &ShippingAddress,
        email: Option<String>,
        mode: PaymentMode,
    ) -> Result<CheckoutOutcome, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let total = validate_attempt(&items, shipping)?;

        if mode == PaymentMode::Bnpl && total < self.config.bnpl_minimum {
            return Err(CommerceError::ValidationError(bnpl_threshold_message(
                self.config.bnpl_minimum,
            )));
        }

        let request = PaymentRequest {
            amount: total,
            currency: self.config.currency.clone(),
            description: match mode {
                PaymentMode::Bnpl => "Pay Later".to_string(),
                _ => "Online Payment".to_string(),
            },
            methods: match mode {
                PaymentMode::Bnpl => MethodFlags::pay_later(),
                _ => MethodFlags::online(),
            },
            prefill: PaymentPrefill {
                name: shipping.name.clone(),
                email,
                contact: shipping.phone.clone(),
            },
        };

        match self.widget.open(request).await {
            PaymentOutcome::Confirmed(confirmation) => {
                info!(
                    user_id = %user,
                    payment_id = ?confirmation.payment_id,
                    "Payment confirmed"
                );
                let order = self
                    .create_order(&user, items, total, shipping, mode)
                    .await?;
                Ok(CheckoutOutcome::Placed(order))
            }
            PaymentOutcome::Abandoned => {
                info!(user_id = %user, payment_mode = %mode, "Payment widget closed without confirmation");
                self.event_sender
                    .send_or_log(Event::PaymentAbandoned {
                        user_id: user,
                        payment_mode: mode,
                    })
                    .await;
                Ok(CheckoutOutcome::Abandoned)
            }
        }
    }

    /// Single write path for all three settlement modes.
    ///
    /// The wallet credit runs strictly after the order write succeeds and
    /// before success is reported; the cart is cleared last.
    async fn create_order(
        &self,
        user: &UserId,
        items: Vec<CartLine>,
        total: Decimal,
        shipping: &ShippingAddress,
        mode: PaymentMode,
    ) -> Result<Order, CommerceError> {
        let order_id = self.store.new_child_key(&paths::orders(user));

        let order = Order {
            order_id: order_id.clone(),
            items,
            total,
            shipping: shipping.clone(),
            payment_mode: mode,
            status: if mode == PaymentMode::Cod {
                OrderStatus::Pending
            } else {
                OrderStatus::Paid
            },
            date: Utc::now(),
            cancel_requested: false,
        };

        self.store
            .write(
                &paths::order(user, &order_id),
                serde_json::to_value(&order)?,
            )
            .await?;

        if mode.is_hosted() {
            let coins = pricing::reward_coins(total, self.config.reward_coin_rate);
            self.wallet.credit(coins).await?;
        }

        self.cart.clear().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                user_id: user.clone(),
                order_id: order.order_id.clone(),
                payment_mode: mode,
                total,
            })
            .await;

        info!(
            user_id = %user,
            order_id = %order.order_id,
            payment_mode = %mode,
            total = %total,
            "Order placed"
        );
        Ok(order)
    }
}

/// Precondition for every settlement path: a non-empty cart and a complete
/// shipping address. Local only; contacts no collaborator.
fn validate_attempt(
    items: &[CartLine],
    shipping: &ShippingAddress,
) -> Result<Decimal, CommerceError> {
    shipping.validate_complete()?;
    if items.is_empty() {
        return Err(CommerceError::ValidationError("Cart is empty".to_string()));
    }
    Ok(pricing::cart_total(items))
}
