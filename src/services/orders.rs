use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::{
    auth::{require_user, IdentityProvider},
    errors::CommerceError,
    events::{Event, EventSender},
    models::order::{CancellationRequest, CancellationStatus, Order},
    store::{paths, DocumentStore},
};

/// Read side of a user's order history plus the cancellation-request
/// workflow.
///
/// Orders are created by checkout only; this service never mutates items,
/// totals or shipping. Approval of a cancellation request (and every
/// later fulfillment transition) happens on the external order-management
/// surface.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    identity: Arc<dyn IdentityProvider>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
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

    /// The user's orders, newest first. Empty list when there are none.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let snapshot = self.store.read(&paths::orders(&user)).await?;

        let map = match snapshot {
            Some(Value::Object(map)) => map,
            _ => return Ok(Vec::new()),
        };

        // Push keys are chronological, so reverse key order is newest
        // first.
        let mut orders = map
            .into_iter()
            .map(|(_, doc)| serde_json::from_value(doc))
            .collect::<Result<Vec<Order>, _>>()?;
        orders.reverse();
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: &str) -> Result<Order, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let doc = self
            .store
            .read(&paths::order(&user, order_id))
            .await?
            .ok_or_else(|| CommerceError::NotFound(format!("order {} not found", order_id)))?;
        Ok(serde_json::from_value(doc)?)
    }

    /// Submits a cancellation request for a live order.
    ///
    /// Writes the request record, then flips the order to
    /// `Pending Cancel` with `cancelRequested` set. The order itself is
    /// not cancelled here; that transition belongs to the approval
    /// surface.
    #[instrument(skip(self, reason))]
    pub async fn request_cancellation(
        &self,
        order_id: &str,
        reason: &str,
    ) -> Result<CancellationRequest, CommerceError> {
        let user = require_user(self.identity.as_ref())?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CommerceError::ValidationError(
                "Please select a reason".to_string(),
            ));
        }

        let order = self.get_order(order_id).await?;
        if order.cancel_requested {
            return Err(CommerceError::ValidationError(
                "A cancellation request is already pending for this order".to_string(),
            ));
        }
        if !order.status.is_cancellable() {
            return Err(CommerceError::ValidationError(format!(
                "Order can no longer be cancelled (status: {})",
                order.status
            )));
        }

        let request = CancellationRequest {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
            requested_at: Utc::now(),
            status: CancellationStatus::Pending,
        };

        self.store
            .write(
                &paths::cancel_request(&user, order_id),
                serde_json::to_value(&request)?,
            )
            .await?;

        let mut patch = serde_json::Map::new();
        patch.insert("cancelRequested".to_string(), Value::Bool(true));
        patch.insert("status".to_string(), Value::from("Pending Cancel"));
        self.store
            .update(&paths::order(&user, order_id), patch)
            .await?;

        self.event_sender
            .send_or_log(Event::CancellationRequested {
                user_id: user.clone(),
                order_id: order_id.to_string(),
            })
            .await;

        info!(user_id = %user, order_id = %order_id, "Cancellation requested");
        Ok(request)
    }

    /// The user's cancellation requests, keyed by order id.
    #[instrument(skip(self))]
    pub async fn cancellation_requests(
        &self,
    ) -> Result<BTreeMap<String, CancellationRequest>, CommerceError> {
        let user = require_user(self.identity.as_ref())?;
        let snapshot = self.store.read(&paths::cancel_requests(&user)).await?;

        let map = match snapshot {
            Some(Value::Object(map)) => map,
            _ => return Ok(BTreeMap::new()),
        };

        map.into_iter()
            .map(|(order_id, doc)| Ok((order_id, serde_json::from_value(doc)?)))
            .collect()
    }
}
