//! Session state machine behavior against a mock backend.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use seren_client::{ApiClient, RetryPolicy, UserIdentity};
use seren_session::{SessionStatus, SessionStore};

fn client_for(server_uri: &str) -> ApiClient {
    ApiClient::builder()
        .base_url(server_uri)
        .retry_policy(RetryPolicy {
            timeout: Duration::from_millis(200),
            max_retries: 0,
            base_delay: Duration::from_millis(10),
        })
        .build()
        .unwrap()
}

async fn mock_check_auth(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/auth/user/authenticated/"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

async fn mock_refresh(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path("/api/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn starts_unknown() {
    let server = MockServer::start().await;
    let store = SessionStore::new(client_for(&server.uri()));
    assert_eq!(store.status(), SessionStatus::Unknown);
    assert!(store.user().is_none());
}

#[tokio::test]
async fn validate_with_credential_and_identity_authenticates() {
    let server = MockServer::start().await;
    mock_check_auth(&server, 200).await;

    let client = client_for(&server.uri());
    client.identity().save(&UserIdentity::new("7", "a@b.c"));

    let store = SessionStore::new(client);
    let snapshot = store.validate().await;

    assert_eq!(snapshot.status, SessionStatus::Authenticated);
    assert_eq!(snapshot.user, Some(UserIdentity::new("7", "a@b.c")));
    assert_eq!(store.status(), SessionStatus::Authenticated);
}

#[tokio::test]
async fn validate_with_missing_identity_fails_closed() {
    let server = MockServer::start().await;
    mock_check_auth(&server, 200).await;

    // Credential is valid but no identity fields were ever stored.
    let store = SessionStore::new(client_for(&server.uri()));
    let snapshot = store.validate().await;

    assert_eq!(snapshot.status, SessionStatus::Anonymous);
    assert!(snapshot.user.is_none());
}

#[tokio::test]
async fn validate_clears_stale_identity_on_rejected_credential() {
    let server = MockServer::start().await;
    mock_check_auth(&server, 401).await;
    mock_refresh(&server, 401).await;

    let client = client_for(&server.uri());
    client.identity().save(&UserIdentity::new("7", "a@b.c"));

    let store = SessionStore::new(client.clone());
    let snapshot = store.validate().await;

    assert_eq!(snapshot.status, SessionStatus::Anonymous);
    // The failed refresh must have cleared the stored identity.
    assert!(client.identity().load().is_none());
}

#[tokio::test]
async fn validate_treats_network_failure_as_anonymous() {
    // Nothing is listening on this port.
    let client = client_for("http://127.0.0.1:9");
    client.identity().save(&UserIdentity::new("7", "a@b.c"));

    let store = SessionStore::new(client);
    let snapshot = store.validate().await;

    assert_eq!(snapshot.status, SessionStatus::Anonymous);
}

#[tokio::test]
async fn validate_recovers_through_refresh() {
    let server = MockServer::start().await;

    // Expired access credential, refresh still valid.
    Mock::given(method("GET"))
        .and(path("/api/auth/user/authenticated/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mock_refresh(&server, 200).await;

    let client = client_for(&server.uri());
    client.identity().save(&UserIdentity::new("7", "a@b.c"));

    let store = SessionStore::new(client);
    let snapshot = store.validate().await;

    assert_eq!(snapshot.status, SessionStatus::Authenticated);
}

#[tokio::test]
async fn login_is_immediate_and_persists_identity() {
    let server = MockServer::start().await;
    let client = client_for(&server.uri());
    let store = SessionStore::new(client.clone());

    store.login(UserIdentity::new("7", "a@b.c"));

    assert_eq!(store.status(), SessionStatus::Authenticated);
    assert_eq!(client.identity().load(), Some(UserIdentity::new("7", "a@b.c")));
}

#[tokio::test]
async fn logout_does_not_resurrect_a_dead_session() {
    let server = MockServer::start().await;
    mock_check_auth(&server, 401).await;
    mock_refresh(&server, 401).await;

    let client = client_for(&server.uri());
    let store = SessionStore::new(client.clone());
    store.login(UserIdentity::new("7", "a@b.c"));

    store.logout().await;

    assert_eq!(store.status(), SessionStatus::Anonymous);
    assert!(client.identity().load().is_none());

    // The follow-up validation must also land on Anonymous.
    let snapshot = store.validate().await;
    assert_eq!(snapshot.status, SessionStatus::Anonymous);
}

#[tokio::test]
async fn logout_sweeps_preserved_state() {
    use std::sync::Arc;

    use seren_cache::{KeyValueStore, MemoryStore, StatePreserver};

    let server = MockServer::start().await;
    mock_check_auth(&server, 401).await;
    mock_refresh(&server, 401).await;

    let backing = Arc::new(MemoryStore::new());
    let preserver = StatePreserver::new(Arc::clone(&backing) as Arc<dyn KeyValueStore>);
    preserver.preserve("draft", &json!({"amount": 12}));

    let store = SessionStore::with_preserver(client_for(&server.uri()), preserver.clone());
    store.login(UserIdentity::new("7", "a@b.c"));

    store.logout().await;

    assert_eq!(preserver.restore("draft"), None);
}

#[tokio::test]
async fn profile_is_cached_per_user() {
    let server = MockServer::start().await;
    mock_check_auth(&server, 200).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/user/profile/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.c", "verified": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    client.identity().save(&UserIdentity::new("7", "a@b.c"));

    let store = SessionStore::new(client);
    store.validate().await;

    let first = store.profile().await.unwrap();
    let second = store.profile().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first["email"], "a@b.c");
}

#[tokio::test]
async fn profile_requires_authentication() {
    let server = MockServer::start().await;
    let store = SessionStore::new(client_for(&server.uri()));
    assert!(store.profile().await.is_none());
}
