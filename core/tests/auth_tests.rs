// tests/auth_tests.rs
mod common;

use common::*;
use serde_json::json;
use serial_test::serial;
use std::sync::Arc;
use storefront::{AuthClient, CartSync, MemoryStore, RemoteStore, Session, SignUpOutcome, StoreConfig, StoreError};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANON_KEY: &str = "anon-key";

fn auth_client(server: &MockServer, session: &Session) -> AuthClient {
  AuthClient::new(StoreConfig::new(server.uri(), ANON_KEY).unwrap(), session.clone()).unwrap()
}

fn session_body(user_id: Uuid, email: &str) -> serde_json::Value {
  json!({
    "access_token": "jwt-access",
    "token_type": "bearer",
    "expires_in": 3600,
    "refresh_token": "jwt-refresh",
    "user": { "id": user_id, "email": email, "aud": "authenticated", "role": "authenticated" }
  })
}

#[tokio::test]
#[serial]
async fn test_sign_in_establishes_session_and_loads_cart() {
  setup_tracing();
  let server = MockServer::start().await;
  let user_id = Uuid::new_v4();
  Mock::given(method("POST"))
    .and(path("/auth/v1/token"))
    .and(query_param("grant_type", "password"))
    .and(header("apikey", ANON_KEY))
    .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(session_body(user_id, "ada@example.com")))
    .expect(1)
    .mount(&server)
    .await;

  let lamp = lamp();
  let store = Arc::new(MemoryStore::new());
  store.seed(storefront::Table::Products, &[lamp.clone()]).unwrap();
  let owner = storefront::models::SessionUser {
    id: user_id,
    email: None,
  };
  seed_cart_line(&store, &owner, &lamp, 2);

  let session = Session::new();
  let cart = Arc::new(CartSync::new(store as Arc<dyn RemoteStore>));
  cart.attach(&session);

  let user = auth_client(&server, &session)
    .sign_in_with_password(" ada@example.com ", "hunter22")
    .await
    .unwrap();

  assert_eq!(user.id, user_id);
  assert_eq!(session.access_token().as_deref(), Some("jwt-access"));
  assert_eq!(cart.count(), 2);
}

#[tokio::test]
#[serial]
async fn test_bad_credentials_are_an_auth_error() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/v1/token"))
    .respond_with(ResponseTemplate::new(400).set_body_json(json!({
      "error": "invalid_grant",
      "error_description": "Invalid login credentials"
    })))
    .mount(&server)
    .await;

  let session = Session::new();
  let err = auth_client(&server, &session)
    .sign_in_with_password("ada@example.com", "wrong")
    .await
    .unwrap_err();

  assert!(matches!(err, StoreError::Auth(ref m) if m == "Invalid login credentials"));
  assert!(!session.is_signed_in());
}

#[tokio::test]
#[serial]
async fn test_blank_credentials_never_reach_the_server() {
  setup_tracing();
  let server = MockServer::start().await;
  let session = Session::new();
  let err = auth_client(&server, &session).sign_up("   ", "secret").await.unwrap_err();
  assert!(matches!(err, StoreError::Auth(_)));
  assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
#[serial]
async fn test_sign_up_outcomes() {
  setup_tracing();
  let server = MockServer::start().await;
  let confirmed_id = Uuid::new_v4();
  let pending_id = Uuid::new_v4();
  Mock::given(method("POST"))
    .and(path("/auth/v1/signup"))
    .and(body_json(json!({ "email": "ada@example.com", "password": "hunter22" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(session_body(confirmed_id, "ada@example.com")))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path("/auth/v1/signup"))
    .and(body_json(json!({ "email": "grace@example.com", "password": "hunter22" })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "id": pending_id,
      "email": "grace@example.com",
      "confirmation_sent_at": "2024-03-01T12:00:00Z"
    })))
    .mount(&server)
    .await;

  let session = Session::new();
  let client = auth_client(&server, &session);

  let pending = client.sign_up("grace@example.com", "hunter22").await.unwrap();
  assert!(matches!(pending, SignUpOutcome::ConfirmationRequired(ref u) if u.id == pending_id));
  assert!(!session.is_signed_in());

  let confirmed = client.sign_up("ada@example.com", "hunter22").await.unwrap();
  assert!(matches!(confirmed, SignUpOutcome::SignedIn(ref u) if u.id == confirmed_id));
  assert_eq!(session.current_user().map(|u| u.id), Some(confirmed_id));
}

#[tokio::test]
#[serial]
async fn test_sign_out_ends_local_session_even_when_remote_fails() {
  setup_tracing();
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path("/auth/v1/logout"))
    .and(header("authorization", "Bearer token-signed-in"))
    .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "msg": "upstream down" })))
    .expect(1)
    .mount(&server)
    .await;

  let session = Session::new();
  let mut signed_in = auth_session(&user("ada@example.com"));
  signed_in.access_token = "token-signed-in".to_string();
  session.establish(signed_in).await;

  auth_client(&server, &session).sign_out().await;

  assert!(!session.is_signed_in());
  assert!(session.current_user().is_none());
}
