mod common;

use assert_matches::assert_matches;
use common::{product, TestApp};
use rust_decimal_macros::dec;
use storefront_core::{
    errors::CommerceError,
    models::{OrderStatus, PaymentMode, ShippingAddress},
    services::CheckoutOutcome,
};

fn shipping() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Verma".into(),
        phone: "9876543210".into(),
        line1: "14 MG Road".into(),
        city: "Pune".into(),
        state: "Maharashtra".into(),
        pincode: "411001".into(),
    }
}

#[tokio::test]
async fn cod_checkout_places_pending_order_without_wallet_credit() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line({
            let mut p = product("p1", dec!(500), None);
            p.quantity = 2;
            p
        })
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    let order = services
        .checkout
        .checkout_cod(items, &shipping())
        .await
        .unwrap();

    assert_eq!(order.total, dec!(1000));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_mode, PaymentMode::Cod);
    assert!(!order.order_id.is_empty());

    // No reward coins on cash on delivery.
    assert_eq!(services.wallet.balance().await.unwrap(), 0);

    // The order is durable. Clearing the cart on success (rather than
    // keeping it for reorder convenience) is a deliberate policy choice;
    // this assertion pins it.
    let listed = services.orders.list_orders().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].order_id, order.order_id);
    assert!(services.cart.load_cart().await.unwrap().is_empty());
}

#[tokio::test]
async fn confirmed_online_checkout_pays_and_credits_coins() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line(product("p1", dec!(1000), Some(dec!(10))))
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    app.widget.confirm_next();
    let outcome = services
        .checkout
        .checkout_online(items, &shipping(), Some("asha@example.in".into()))
        .await
        .unwrap();

    let order = match outcome {
        CheckoutOutcome::Placed(order) => order,
        CheckoutOutcome::Abandoned => panic!("expected a placed order"),
    };
    assert_eq!(order.total, dec!(900));
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.payment_mode, PaymentMode::Online);

    // floor(900 * 0.02) = 18 coins, credited after the order write.
    assert_eq!(services.wallet.balance().await.unwrap(), 18);
    assert!(services.cart.load_cart().await.unwrap().is_empty());

    // The widget was asked for the discounted total.
    let request = app.widget.last_request().unwrap();
    assert_eq!(request.amount, dec!(900));
    assert_eq!(request.currency, "INR");
    assert!(!request.methods.pay_later);
    assert_eq!(request.prefill.contact, "9876543210");
}

#[tokio::test]
async fn pay_later_below_threshold_fails_locally() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line({
            let mut p = product("p1", dec!(1000), None);
            p.quantity = 2;
            p
        })
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    // Total 2000 < 3000 threshold.
    let result = services
        .checkout
        .checkout_pay_later(items, &shipping(), None)
        .await;
    assert_matches!(result, Err(CommerceError::ValidationError(_)));

    // No order was created and no collaborator was contacted.
    assert_eq!(app.widget.opened(), 0);
    assert!(services.orders.list_orders().await.unwrap().is_empty());
    assert_eq!(services.wallet.balance().await.unwrap(), 0);
}

#[tokio::test]
async fn pay_later_at_threshold_settles_through_widget() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line({
            let mut p = product("p1", dec!(1500), None);
            p.quantity = 2;
            p
        })
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    app.widget.confirm_next();
    let outcome = services
        .checkout
        .checkout_pay_later(items, &shipping(), None)
        .await
        .unwrap();

    let order = match outcome {
        CheckoutOutcome::Placed(order) => order,
        CheckoutOutcome::Abandoned => panic!("expected a placed order"),
    };
    assert_eq!(order.payment_mode, PaymentMode::Bnpl);
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(services.wallet.balance().await.unwrap(), 60); // floor(3000 * 0.02)

    let request = app.widget.last_request().unwrap();
    assert!(request.methods.pay_later);
}

#[tokio::test]
async fn incomplete_shipping_blocks_every_settlement_path() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line(product("p1", dec!(5000), None))
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    let incomplete = ShippingAddress {
        pincode: "".into(),
        ..shipping()
    };

    assert_matches!(
        services.checkout.checkout_cod(items.clone(), &incomplete).await,
        Err(CommerceError::ValidationError(_))
    );
    assert_matches!(
        services
            .checkout
            .checkout_online(items.clone(), &incomplete, None)
            .await,
        Err(CommerceError::ValidationError(_))
    );
    assert_matches!(
        services
            .checkout
            .checkout_pay_later(items, &incomplete, None)
            .await,
        Err(CommerceError::ValidationError(_))
    );

    // No order in any case, and the widget never opened.
    assert_eq!(app.widget.opened(), 0);
    assert!(services.orders.list_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn abandoned_widget_leaves_all_durable_state_untouched() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line(product("p1", dec!(1000), None))
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    app.widget.abandon_next();
    let outcome = services
        .checkout
        .checkout_online(items, &shipping(), None)
        .await
        .unwrap();
    assert_matches!(outcome, CheckoutOutcome::Abandoned);

    // No order, no coins, cart untouched; the attempt is editable again.
    assert!(services.orders.list_orders().await.unwrap().is_empty());
    assert_eq!(services.wallet.balance().await.unwrap(), 0);
    assert_eq!(services.cart.load_cart().await.unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let app = TestApp::signed_out().await;

    let result = app
        .state
        .services
        .checkout
        .checkout_cod(Vec::new(), &shipping())
        .await;
    assert_matches!(result, Err(CommerceError::NotAuthenticated));
}

#[tokio::test]
async fn empty_cart_cannot_check_out() {
    let app = TestApp::new().await;

    let result = app
        .state
        .services
        .checkout
        .checkout_cod(Vec::new(), &shipping())
        .await;
    assert_matches!(result, Err(CommerceError::ValidationError(_)));
}

#[tokio::test]
async fn order_write_failure_surfaces_and_creates_nothing() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line(product("p1", dec!(500), None))
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    app.store.fail_writes(true);
    let result = services.checkout.checkout_cod(items, &shipping()).await;
    assert_matches!(result, Err(CommerceError::CollaboratorWriteFailed(_)));
    app.store.fail_writes(false);

    // The failed attempt left no order behind and kept the cart.
    assert!(services.orders.list_orders().await.unwrap().is_empty());
    assert_eq!(services.cart.load_cart().await.unwrap().len(), 1);
}

#[tokio::test]
async fn coins_accumulate_across_paid_orders() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    for _ in 0..2 {
        services
            .cart
            .add_line(product("p1", dec!(1000), None))
            .await
            .unwrap();
        let items = services.cart.load_cart().await.unwrap();

        app.widget.confirm_next();
        let outcome = services
            .checkout
            .checkout_online(items, &shipping(), None)
            .await
            .unwrap();
        assert_matches!(outcome, CheckoutOutcome::Placed(_));
    }

    // floor(1000 * 0.02) = 20 per order, read-modify-write accumulation.
    assert_eq!(services.wallet.balance().await.unwrap(), 40);
    assert_eq!(services.orders.list_orders().await.unwrap().len(), 2);
}

#[tokio::test]
async fn order_snapshot_is_by_value() {
    let app = TestApp::new().await;
    let services = &app.state.services;

    services
        .cart
        .add_line(product("p1", dec!(500), None))
        .await
        .unwrap();
    let items = services.cart.load_cart().await.unwrap();

    let order = services
        .checkout
        .checkout_cod(items, &shipping())
        .await
        .unwrap();

    // Mutating the cart afterwards does not touch the placed order.
    services
        .cart
        .add_line(product("p2", dec!(999), None))
        .await
        .unwrap();

    let stored = services.orders.get_order(&order.order_id).await.unwrap();
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].product_id, "p1");
    assert_eq!(stored.shipping, shipping());
}
