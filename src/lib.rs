//! Storefront Commerce Core
//!
//! Client-side commerce logic for a storefront whose durable state lives
//! in an external realtime document store: cart management, pure price
//! resolution, the order placement workflow (cash on delivery, hosted
//! online payment, deferred payment), reward-coin accrual, order
//! cancellation requests, wishlist, and reviews.
//!
//! Identity, the document store, the hosted payment widget and the image
//! host are collaborators this crate consumes through traits; it
//! implements none of them (the in-memory store exists for tests and
//! local development).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod images;
pub mod models;
pub mod payments;
pub mod services;
pub mod store;

use std::sync::Arc;

use auth::IdentityProvider;
use config::AppConfig;
use events::EventSender;
use images::ImageHost;
use payments::HostedCheckout;
use store::DocumentStore;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<AppConfig>,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

/// The wired service set, one instance per session context.
#[derive(Clone)]
pub struct AppServices {
    pub cart: Arc<services::CartService>,
    pub checkout: Arc<services::CheckoutService>,
    pub wallet: Arc<services::WalletService>,
    pub orders: Arc<services::OrderService>,
    pub wishlist: Arc<services::WishlistService>,
    pub reviews: Arc<services::ReviewService>,
}

impl AppState {
    /// Wires the services against the given collaborators.
    ///
    /// Call once per session: the identity snapshot and the live cart
    /// subscription are session-scoped, not process-global.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        identity: Arc<dyn IdentityProvider>,
        checkout_widget: Arc<dyn HostedCheckout>,
        image_host: Arc<dyn ImageHost>,
        config: AppConfig,
        event_sender: EventSender,
    ) -> Self {
        let config = Arc::new(config);
        let event_sender = Arc::new(event_sender);

        let cart = Arc::new(services::CartService::new(
            store.clone(),
            identity.clone(),
            event_sender.clone(),
        ));
        let wallet = Arc::new(services::WalletService::new(
            store.clone(),
            identity.clone(),
            event_sender.clone(),
        ));
        let checkout = Arc::new(services::CheckoutService::new(
            store.clone(),
            identity.clone(),
            checkout_widget,
            cart.clone(),
            wallet.clone(),
            event_sender.clone(),
            config.clone(),
        ));
        let orders = Arc::new(services::OrderService::new(
            store.clone(),
            identity.clone(),
            event_sender.clone(),
        ));
        let wishlist = Arc::new(services::WishlistService::new(
            store.clone(),
            identity.clone(),
            event_sender.clone(),
        ));
        let reviews = Arc::new(services::ReviewService::new(
            store.clone(),
            identity.clone(),
            image_host,
            event_sender.clone(),
            config.clone(),
        ));

        Self {
            store,
            identity,
            config,
            event_sender,
            services: AppServices {
                cart,
                checkout,
                wallet,
                orders,
                wishlist,
                reviews,
            },
        }
    }

    pub fn cart_service(&self) -> Arc<services::CartService> {
        self.services.cart.clone()
    }

    pub fn checkout_service(&self) -> Arc<services::CheckoutService> {
        self.services.checkout.clone()
    }

    pub fn order_service(&self) -> Arc<services::OrderService> {
        self.services.orders.clone()
    }

    pub fn wallet_service(&self) -> Arc<services::WalletService> {
        self.services.wallet.clone()
    }
}
