//! Integration tests for signing in, out and back in across restarts.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use cartwheel_integration_tests::{TOKEN, TestContext, auth_json};
use cartwheel_storefront::Outcome;
use cartwheel_storefront::api::Registration;
use cartwheel_storefront::storage::keys;

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

#[tokio::test]
async fn test_login_persists_session() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .and(body_json(json!({"username": "ada", "password": "lovelace"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json()))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let outcome = dispatcher.login(" ada ", &password("lovelace")).await;

    let profile = outcome.ok().expect("login should succeed");
    assert_eq!(profile.display_name(), "Ada Lovelace");
    assert!(dispatcher.state().auth.is_authenticated());
    assert_eq!(
        ctx.storage().get(keys::ACCESS_TOKEN).unwrap().as_deref(),
        Some(TOKEN)
    );
    assert!(ctx.storage().get(keys::USER_INFO).unwrap().is_some());
}

#[tokio::test]
async fn test_rejected_login_surfaces_detail() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let outcome = dispatcher.login("ada", &password("wrong")).await;

    assert_eq!(
        outcome.error(),
        Some("No active account found with the given credentials")
    );
    let state = dispatcher.state();
    assert!(!state.auth.is_authenticated());
    assert_eq!(
        state.auth.error.as_deref(),
        Some("No active account found with the given credentials")
    );
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
}

#[tokio::test]
async fn test_register_field_error() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "username": ["A user with that username already exists."]
        })))
        .mount(&ctx.server)
        .await;

    let dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .register(&Registration {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: password("lovelace"),
            name: "Ada".to_string(),
        })
        .await;

    assert_eq!(
        outcome.error(),
        Some("username: A user with that username already exists.")
    );
}

#[tokio::test]
async fn test_session_survives_restart() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_json()))
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/cart/"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let first = ctx.dispatcher();
    assert!(first.login("ada", &password("lovelace")).await.is_ok());
    drop(first);

    let second = ctx.dispatcher();
    let state = second.state();
    assert_eq!(
        state.auth.profile.as_ref().map(|p| p.username.as_str()),
        Some("ada")
    );
    assert!(second.fetch_cart().await.is_ok());
}

#[tokio::test]
async fn test_logout_clears_persisted_session() {
    let ctx = TestContext::new().await;
    ctx.seed_session();

    let dispatcher = ctx.dispatcher();
    assert!(dispatcher.state().auth.is_authenticated());

    assert!(matches!(dispatcher.logout(), Outcome::Ok(())));
    assert!(!dispatcher.state().auth.is_authenticated());
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
    assert!(ctx.storage().get(keys::USER_INFO).unwrap().is_none());

    let restarted = ctx.dispatcher();
    assert!(!restarted.state().auth.is_authenticated());
    assert_eq!(ctx.request_count().await, 0);
}

#[tokio::test]
async fn test_half_written_session_is_discarded() {
    let ctx = TestContext::new().await;
    ctx.storage().set(keys::ACCESS_TOKEN, TOKEN).unwrap();

    let dispatcher = ctx.dispatcher();

    assert!(!dispatcher.state().auth.is_authenticated());
    assert!(ctx.storage().get(keys::ACCESS_TOKEN).unwrap().is_none());
}
