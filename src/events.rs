use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::auth::UserId;
use crate::models::order::PaymentMode;

/// Domain events emitted by the commerce services.
///
/// Events are advisory: failure to deliver one never fails the operation
/// that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartLineAdded {
        user_id: UserId,
        product_id: String,
        quantity: u32,
    },
    CartQuantityUpdated {
        user_id: UserId,
        product_id: String,
        quantity: u32,
    },
    CartLineRemoved {
        user_id: UserId,
        product_id: String,
    },
    CartCleared(UserId),

    // Checkout / order events
    OrderPlaced {
        user_id: UserId,
        order_id: String,
        payment_mode: PaymentMode,
        total: Decimal,
    },
    PaymentAbandoned {
        user_id: UserId,
        payment_mode: PaymentMode,
    },
    WalletCredited {
        user_id: UserId,
        coins_earned: u64,
        new_balance: u64,
    },
    CancellationRequested {
        user_id: UserId,
        order_id: String,
    },

    // Wishlist events
    WishlistAdded {
        user_id: UserId,
        product_id: String,
    },
    WishlistRemoved {
        user_id: UserId,
        product_id: String,
    },

    // Review events
    ReviewSubmitted {
        user_id: UserId,
        order_id: String,
        rating: u8,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    pub fn with_message(message: impl Into<String>) -> Self {
        Event::Generic {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, failing if the channel is closed or full.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging delivery failure instead of propagating it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Event delivery failed: {}", e);
        }
    }
}

/// Creates a connected sender/receiver pair for the event channel.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event.
///
/// Runs until every `EventSender` clone is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderPlaced {
                user_id,
                order_id,
                payment_mode,
                total,
            } => {
                info!(
                    user_id = %user_id,
                    order_id = %order_id,
                    payment_mode = %payment_mode,
                    total = %total,
                    "Order placed"
                );
            }
            Event::WalletCredited {
                user_id,
                coins_earned,
                new_balance,
            } => {
                info!(
                    user_id = %user_id,
                    coins_earned = *coins_earned,
                    new_balance = *new_balance,
                    "Wallet credited"
                );
            }
            other => info!("Received event: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}
