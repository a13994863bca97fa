//! Hosted payment widget collaborator.
//!
//! Online and pay-later settlements are delegated to an external hosted
//! checkout. The widget owns its entire UI and lifecycle; this crate only
//! opens it and awaits a single resolution.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment instruments the widget is asked to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodFlags {
    pub card: bool,
    pub upi: bool,
    pub emi: bool,
    pub pay_later: bool,
}

impl MethodFlags {
    /// Immediate online payment: card / UPI / EMI.
    pub fn online() -> Self {
        Self {
            card: true,
            upi: true,
            emi: true,
            pay_later: false,
        }
    }

    /// Deferred payment: the pay-later instrument enabled on top of the
    /// online set.
    pub fn pay_later() -> Self {
        Self {
            pay_later: true,
            ..Self::online()
        }
    }
}

/// Customer details prefilled into the widget form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPrefill {
    pub name: String,
    pub email: Option<String>,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
    pub methods: MethodFlags,
    pub prefill: PaymentPrefill,
}

/// Confirmation details reported by the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub payment_id: Option<String>,
}

/// Resolution of one widget invocation.
///
/// `Abandoned` is not an error: the user closed the widget without paying
/// and the checkout returns to its editable state.
#[derive(Debug, Clone)]
pub enum PaymentOutcome {
    Confirmed(PaymentConfirmation),
    Abandoned,
}

/// Hosted checkout collaborator.
#[async_trait]
pub trait HostedCheckout: Send + Sync {
    /// Opens the widget for `request` and resolves at most once:
    /// `Confirmed` only on genuine payment confirmation, `Abandoned` when
    /// the widget is closed without one. No timeout is imposed here; the
    /// widget owns its own lifecycle.
    async fn open(&self, request: PaymentRequest) -> PaymentOutcome;
}
