//! Integration tests for cart synchronization.
//!
//! The server owns the cart: each successful change is followed by one
//! refetch, and the client state is whatever that refetch returns.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use cartwheel_core::{CartItemId, Price, ProductId};
use cartwheel_integration_tests::{TOKEN, TestContext, cart_item_json, product_json};
use cartwheel_storefront::Outcome;
use cartwheel_storefront::storage::keys;

#[tokio::test]
async fn test_anonymous_cart_makes_no_requests() {
    let ctx = TestContext::new().await;
    let dispatcher = ctx.dispatcher();

    let cart = dispatcher.fetch_cart().await.ok().unwrap();

    assert!(cart.items.is_empty());
    assert!(dispatcher.add_to_cart(ProductId::new(1), 1).await.is_auth_required());
    assert_eq!(ctx.request_count().await, 0);
}

#[tokio::test]
async fn test_fetch_sends_bearer_credential() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let mug = product_json(1, "Mug", "12.00", 3);
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [cart_item_json(10, &mug, 2)]})),
        )
        .expect(1)
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.fetch_cart().await.is_ok());

    let state = dispatcher.state();
    assert_eq!(state.cart.item_count(), 2);
    assert_eq!(state.cart.subtotal(), Price::from_cents(2400));
}

#[tokio::test]
async fn test_add_refetches_once() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let tea = product_json(2, "Tea", "4.50", 10);
    Mock::given(method("POST"))
        .and(path("/api/cart/add/"))
        .and(body_json(json!({"product_id": 2, "quantity": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5, "quantity": 2})))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([cart_item_json(5, &tea, 2)])))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.add_to_cart(ProductId::new(2), 2).await.is_ok());

    assert_eq!(ctx.requests_to("GET", "/api/cart/").await, 1);
    let state = dispatcher.state();
    assert_eq!(state.cart.items.len(), 1);
    assert_eq!(state.cart.subtotal(), Price::from_cents(900));
}

#[tokio::test]
async fn test_zero_quantity_removes_line() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("POST"))
        .and(path("/api/cart/remove/"))
        .and(body_json(json!({"item_id": 5})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.update_item(CartItemId::new(5), 0).await.is_ok());
    assert!(dispatcher.state().cart.is_empty());
}

#[tokio::test]
async fn test_rejected_change_keeps_cart_and_shows_detail() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let mug = product_json(1, "Mug", "12.00", 3);
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [cart_item_json(10, &mug, 1)]})),
        )
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Not enough stock"})),
        )
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.fetch_cart().await.is_ok());
    let outcome = dispatcher.update_item(CartItemId::new(10), 2).await;

    assert_eq!(outcome.error(), Some("Not enough stock"));
    let state = dispatcher.state();
    assert_eq!(state.cart.error.as_deref(), Some("Not enough stock"));
    assert_eq!(state.cart.item_count(), 1);
    assert_eq!(ctx.requests_to("GET", "/api/cart/").await, 1);
}

#[tokio::test]
async fn test_expired_credential_yields_empty_cart_and_signs_out() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Given token not valid for any token type"
        })))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.state().auth.is_authenticated());
    let cart = dispatcher.fetch_cart().await.ok().unwrap();

    assert!(cart.items.is_empty());
    let state = dispatcher.state();
    assert!(state.cart.error.is_none());
    assert!(!state.cart.loading);
    assert!(state.auth.profile.is_none());
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert!(ctx.storage().get(keys::USER_INFO).unwrap().is_none());

    let restarted = ctx.dispatcher();
    assert!(!restarted.state().auth.is_authenticated());
}

#[tokio::test]
async fn test_mutation_with_expired_credential_needs_login() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("POST"))
        .and(path("/api/cart/add/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let outcome = dispatcher.add_to_cart(ProductId::new(1), 1).await;

    assert!(matches!(outcome, Outcome::AuthRequired));
    assert!(dispatcher.state().cart.error.is_none());
    assert!(!dispatcher.state().auth.is_authenticated());
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert_eq!(ctx.requests_to("GET", "/api/cart/").await, 0);
}

#[tokio::test]
async fn test_server_error_message() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>Unavailable</html>"))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let outcome = dispatcher.fetch_cart().await;

    assert_eq!(outcome.error(), Some("Request failed with status code 503"));
}

#[tokio::test]
async fn test_overlapping_increments_never_exceed_stock() {
    let ctx = TestContext::new().await;
    ctx.seed_session();
    let mug = product_json(1, "Mug", "12.00", 3);
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [cart_item_json(10, &mug, 2)]})),
        )
        .up_to_n_times(1)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"items": [cart_item_json(10, &mug, 3)]})),
        )
        .mount(&ctx.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/cart/update/"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(100)))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.fetch_cart().await.is_ok());
    let item_id = CartItemId::new(10);

    let (a, b, c) = tokio::join!(
        dispatcher.increment(item_id),
        dispatcher.increment(item_id),
        dispatcher.increment(item_id)
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());

    let updates: Vec<Value> = ctx
        .server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/cart/update/")
        .map(|r| r.body_json().unwrap())
        .collect();
    assert!(!updates.is_empty());
    for body in &updates {
        assert_eq!(body["quantity"], 3);
    }
    assert_eq!(dispatcher.state().cart.items[0].quantity, 3);
}
