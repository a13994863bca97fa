use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::address::ShippingAddress;
use super::cart::CartLine;

/// Settlement mode chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "COD")]
    Cod,
    #[serde(rename = "ONLINE")]
    Online,
    #[serde(rename = "BNPL")]
    Bnpl,
}

impl PaymentMode {
    /// Whether settlement happens through the hosted payment widget.
    pub fn is_hosted(self) -> bool {
        !matches!(self, PaymentMode::Cod)
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMode::Cod => "COD",
            PaymentMode::Online => "ONLINE",
            PaymentMode::Bnpl => "BNPL",
        };
        f.write_str(s)
    }
}

/// Order lifecycle status.
///
/// This crate writes `Pending` (cash on delivery), `Paid` (hosted
/// settlement) and `PendingCancel` (cancellation requested); `Cancelled`
/// and `Delivered` arrive through the external order-management surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
    #[serde(rename = "Pending Cancel")]
    PendingCancel,
    Cancelled,
    Delivered,
}

impl OrderStatus {
    /// Whether a cancellation request may still be submitted.
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Paid)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::PendingCancel => "Pending Cancel",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Delivered => "Delivered",
        };
        f.write_str(s)
    }
}

/// Immutable record of a completed checkout attempt.
///
/// `items` and `shipping` are by-value snapshots taken at creation; only
/// the status family of fields changes afterwards, and never through this
/// crate's checkout path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    pub items: Vec<CartLine>,
    pub total: Decimal,
    pub shipping: ShippingAddress,
    pub payment_mode: PaymentMode,
    pub status: OrderStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub cancel_requested: bool,
}

/// A user's request to cancel a placed order, pending admin approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    pub order_id: String,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
    pub status: CancellationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancellationStatus {
    Pending,
    Approved,
    Rejected,
}
