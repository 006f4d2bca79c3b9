//! Integration tests for checkout and order history.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use cartwheel_core::{AddressId, OrderId, OrderStatus, Price};
use cartwheel_integration_tests::{
    TestContext, address_json, cart_item_json, order_json, product_json,
};
use cartwheel_storefront::Dispatcher;
use cartwheel_storefront::storage::keys;
use cartwheel_storefront::store::CheckoutStep;

/// Serve a one-line cart once, then an empty cart from then on.
async fn mount_cart_drained_by_order(ctx: &TestContext) -> Value {
    let tea = product_json(2, "Tea", "4.50", 10);
    let line = cart_item_json(5, &tea, 2);

    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [line.clone()]})))
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&ctx.server)
        .await;

    json!({"product": tea, "quantity": 2, "price": "4.50"})
}

async fn mount_addresses(ctx: &TestContext) {
    Mock::given(method("GET"))
        .and(path("/api/orders/addresses/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([address_json(1, false), address_json(2, true)])),
        )
        .mount(&ctx.server)
        .await;
}

async fn start_checkout(ctx: &TestContext) -> Dispatcher {
    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.fetch_cart().await.is_ok());
    assert!(dispatcher.begin_checkout().await.is_ok());
    dispatcher
}

#[tokio::test]
async fn test_checkout_end_to_end() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let order_item = mount_cart_drained_by_order(&ctx).await;
    mount_addresses(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/orders/create/"))
        .and(body_json(json!({
            "address_id": 2,
            "address": "2 Main St",
            "city": "Springfield",
            "postal_code": "12345",
            "country": "US"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(order_json(41, &[order_item], "9.00")),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let dispatcher = start_checkout(&ctx).await;
    let state = dispatcher.state();
    assert_eq!(state.orders.checkout, CheckoutStep::SelectingAddress);
    assert_eq!(state.orders.selected_address, Some(AddressId::new(2)));

    let order = dispatcher.place_order().await.ok().unwrap();

    assert_eq!(order.id, OrderId::new(41));
    assert_eq!(order.total_price, Price::from_cents(900));
    assert_eq!(order.status, OrderStatus::Pending);
    let state = dispatcher.state();
    assert!(state.orders.success);
    assert_eq!(
        state.orders.checkout,
        CheckoutStep::CartRefreshed(OrderId::new(41))
    );
    assert!(state.cart.is_empty());
    assert_eq!(ctx.requests_to("GET", "/api/cart/").await, 2);

    dispatcher.reset_order_success();
    assert!(!dispatcher.state().orders.success);
}

#[tokio::test]
async fn test_checkout_ships_to_chosen_address() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let order_item = mount_cart_drained_by_order(&ctx).await;
    mount_addresses(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/orders/create/"))
        .and(body_json(json!({
            "address_id": 1,
            "address": "1 Main St",
            "city": "Springfield",
            "postal_code": "12345",
            "country": "US"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(order_json(42, &[order_item], "9.00")),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let dispatcher = start_checkout(&ctx).await;
    assert!(dispatcher.select_address(AddressId::new(1)).is_ok());
    assert!(dispatcher.select_address(AddressId::new(9)).error().is_some());
    assert_eq!(
        dispatcher.state().orders.selected_address,
        Some(AddressId::new(1))
    );

    assert!(dispatcher.place_order().await.is_ok());
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    mount_cart_drained_by_order(&ctx).await;
    mount_addresses(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/orders/create/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Not enough stock for Tea"})),
        )
        .mount(&ctx.server)
        .await;

    let dispatcher = start_checkout(&ctx).await;
    let outcome = dispatcher.place_order().await;

    assert_eq!(outcome.error(), Some("Not enough stock for Tea"));
    let state = dispatcher.state();
    assert_eq!(state.orders.checkout, CheckoutStep::SelectingAddress);
    assert!(!state.orders.success);
    assert_eq!(state.cart.item_count(), 2);
    assert_eq!(ctx.requests_to("GET", "/api/cart/").await, 1);
}

#[tokio::test]
async fn test_empty_cart_never_reaches_server() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.fetch_cart().await.is_ok());

    assert_eq!(
        dispatcher.begin_checkout().await.error(),
        Some("Your cart is empty")
    );
    assert_eq!(ctx.requests_to("GET", "/api/orders/addresses/").await, 0);
    assert_eq!(ctx.requests_to("POST", "/api/orders/create/").await, 0);
}

#[tokio::test]
async fn test_order_history_and_status_change() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("GET"))
        .and(path("/api/orders/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [order_json(8, &[], "12.00"), order_json(7, &[], "4.50")]
        })))
        .mount(&ctx.server)
        .await;

    let mut shipped = order_json(7, &[], "4.50");
    shipped["status"] = json!("SHIPPED");
    Mock::given(method("PATCH"))
        .and(path("/api/orders/7/status/"))
        .and(body_json(json!({"status": "SHIPPED"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(shipped))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let orders = dispatcher.fetch_orders().await.ok().unwrap();
    assert_eq!(orders.len(), 2);

    let updated = dispatcher
        .update_order_status(OrderId::new(7), OrderStatus::Shipped)
        .await
        .ok()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Shipped);

    let state = dispatcher.state();
    assert_eq!(state.orders.orders.len(), 2);
    assert_eq!(state.orders.orders[1].status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_anonymous_checkout_needs_login() {
    let ctx = TestContext::new().await;
    let dispatcher = ctx.dispatcher();

    assert!(dispatcher.begin_checkout().await.is_auth_required());
    assert!(dispatcher.place_order().await.is_auth_required());
    assert!(dispatcher.fetch_orders().await.is_auth_required());
    assert_eq!(ctx.request_count().await, 0);
}

#[tokio::test]
async fn test_expired_credential_at_order_time_signs_out() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    mount_cart_drained_by_order(&ctx).await;
    mount_addresses(&ctx).await;
    Mock::given(method("POST"))
        .and(path("/api/orders/create/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&ctx.server)
        .await;

    let dispatcher = start_checkout(&ctx).await;
    assert!(dispatcher.place_order().await.is_auth_required());

    let state = dispatcher.state();
    assert!(!state.auth.is_authenticated());
    assert!(state.cart.is_empty());
    assert_eq!(state.orders.checkout, CheckoutStep::Idle);
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert!(ctx.storage().get(keys::USER_INFO).unwrap().is_none());
}
