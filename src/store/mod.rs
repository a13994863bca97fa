//! Document-store collaborator.
//!
//! All durable state lives in an external path-addressed document store
//! with last-write-wins semantics per path. This module defines the
//! contract the commerce services program against, plus the path layout
//! they share. `memory::MemoryStore` implements the contract in-process
//! for tests and local development; production backends live elsewhere.

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

use crate::errors::StoreError;

pub mod memory;

pub use memory::MemoryStore;

/// Path-addressed JSON document store.
///
/// Reading a path that only has descendants assembles them into a nested
/// object, so `read("carts/u1")` returns every line written under
/// `carts/u1/{productId}`. Subscriptions deliver the value at the
/// subscribed path after every write affecting it, including the
/// subscriber's own writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the value at `path`; `None` when nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replaces the value (and any previous subtree) at `path`.
    async fn write(&self, path: &str, value: Value) -> Result<(), StoreError>;

    /// Shallow-merges `patch` into the document at `path`, creating it if
    /// absent. Untouched fields keep their stored values.
    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError>;

    /// Deletes the value at `path`; succeeds even when nothing is there.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Generates a fresh, chronologically ordered child key for `path`
    /// without touching stored state (push-id semantics: later keys sort
    /// after earlier ones).
    fn new_child_key(&self, path: &str) -> String;

    /// Subscribes to the value at `path`. Each delivered item is the
    /// current value at the path (or `None` after deletion).
    fn subscribe(&self, path: &str) -> broadcast::Receiver<Option<Value>>;
}

/// Store path layout, keyed by user identity.
pub mod paths {
    use crate::auth::UserId;

    pub fn cart(user: &UserId) -> String {
        format!("carts/{}", user)
    }

    pub fn cart_line(user: &UserId, product_id: &str) -> String {
        format!("carts/{}/{}", user, product_id)
    }

    pub fn orders(user: &UserId) -> String {
        format!("orders/{}", user)
    }

    pub fn order(user: &UserId, order_id: &str) -> String {
        format!("orders/{}/{}", user, order_id)
    }

    pub fn wallet(user: &UserId) -> String {
        format!("wallet/{}", user)
    }

    pub fn cancel_requests(user: &UserId) -> String {
        format!("cancelRequests/{}", user)
    }

    pub fn cancel_request(user: &UserId, order_id: &str) -> String {
        format!("cancelRequests/{}/{}", user, order_id)
    }

    pub fn wishlist(user: &UserId) -> String {
        format!("wishlist/{}", user)
    }

    pub fn wishlist_entry(user: &UserId, product_id: &str) -> String {
        format!("wishlist/{}/{}", user, product_id)
    }

    pub fn reviews(order_id: &str) -> String {
        format!("reviews/{}", order_id)
    }

    pub fn review(order_id: &str, user: &UserId) -> String {
        format!("reviews/{}/{}", order_id, user)
    }
}
