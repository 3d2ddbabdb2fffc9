use super::*;
use crate::auth::storage::MemorySessionStorage;
use crate::auth::{SessionState, SessionStore, translate_provider_error};
use crate::error::AuthErrorKind;
use crate::events::SilentNotifier;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> FirebaseConfig {
    FirebaseConfig::new("test-key", "academy-test").with_endpoints(server.uri(), server.uri())
}

fn provider(server: &MockServer, storage: Arc<MemorySessionStorage>) -> FirebaseIdentityProvider {
    FirebaseIdentityProvider::new(config(server), storage).unwrap()
}

fn account_body(id_token: &str) -> serde_json::Value {
    json!({
        "localId": "uid-1",
        "email": "amina@example.com",
        "displayName": "Amina",
        "idToken": id_token,
        "refreshToken": "refresh-1",
        "expiresIn": "3600"
    })
}

fn error_body(message: &str) -> serde_json::Value {
    json!({ "error": { "code": 400, "message": message } })
}

fn expired_session() -> StoredSession {
    StoredSession {
        identity: Identity::new("uid-1").with_email("amina@example.com"),
        refresh_token: "refresh-old".to_string(),
        id_token: Some("id-old".to_string()),
        expires_at: Some(Utc::now() - chrono::Duration::minutes(5)),
    }
}

#[tokio::test]
async fn test_sign_in_persists_session_and_serves_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "email": "amina@example.com",
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body("id-1")))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemorySessionStorage::new());
    let provider = provider(&server, storage.clone());

    let identity = provider
        .sign_in_with_password("amina@example.com", "secret-pass")
        .await
        .unwrap();
    assert_eq!(identity.id, "uid-1");
    assert_eq!(identity.display_name.as_deref(), Some("Amina"));
    assert_eq!(provider.id_token().await.unwrap().as_deref(), Some("id-1"));

    let stored = storage.load().unwrap().unwrap();
    assert_eq!(stored.refresh_token, "refresh-1");
}

#[tokio::test]
async fn test_wrong_password_translates_to_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("INVALID_PASSWORD")))
        .mount(&server)
        .await;

    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));
    let err = provider
        .sign_in_with_password("amina@example.com", "nope")
        .await
        .unwrap_err();
    assert_eq!(err.code, provider_codes::WRONG_PASSWORD);
    assert_eq!(
        translate_provider_error(&err).kind,
        AuthErrorKind::InvalidCredentials
    );
}

#[tokio::test]
async fn test_sign_up_applies_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-2",
            "email": "yusuf@example.com",
            "idToken": "id-2",
            "refreshToken": "refresh-2",
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accounts:update"))
        .and(body_partial_json(json!({
            "idToken": "id-2",
            "displayName": "Yusuf",
            "photoUrl": "https://img/y.png"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-2",
            "email": "yusuf@example.com",
            "displayName": "Yusuf",
            "photoUrl": "https://img/y.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));
    let identity = provider
        .create_account(
            &Registration::new("yusuf@example.com", "longenough")
                .with_name("Yusuf")
                .with_photo_url("https://img/y.png"),
        )
        .await
        .unwrap();
    assert_eq!(identity.display_name.as_deref(), Some("Yusuf"));
    assert_eq!(identity.photo_url.as_deref(), Some("https://img/y.png"));
    // update returned no new tokens, the sign-up token stays current
    assert_eq!(provider.id_token().await.unwrap().as_deref(), Some("id-2"));
}

#[tokio::test]
async fn test_sign_up_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:signUp"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        )))
        .mount(&server)
        .await;

    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));
    let err = provider
        .create_account(&Registration::new("yusuf@example.com", "123"))
        .await
        .unwrap_err();
    assert_eq!(err.code, provider_codes::WEAK_PASSWORD);
}

#[tokio::test]
async fn test_restore_refreshes_expired_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(query_param("key", "test-key"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id_token": "id-new",
            "refresh_token": "refresh-new",
            "expires_in": "3600",
            "user_id": "uid-1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemorySessionStorage::with_session(expired_session()));
    let provider = Arc::new(provider(&server, storage.clone()));
    let store = SessionStore::create(provider.clone(), Arc::new(SilentNotifier));
    assert_eq!(store.state(), SessionState::Unknown);

    let restored = provider.restore().await;
    assert_eq!(restored.map(|i| i.id), Some("uid-1".to_string()));
    assert!(store.is_authenticated());

    assert_eq!(provider.id_token().await.unwrap().as_deref(), Some("id-new"));
    assert_eq!(storage.load().unwrap().unwrap().refresh_token, "refresh-new");
}

#[tokio::test]
async fn test_restore_with_rejected_refresh_token_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body("INVALID_REFRESH_TOKEN")))
        .mount(&server)
        .await;

    let storage = Arc::new(MemorySessionStorage::with_session(expired_session()));
    let provider = Arc::new(provider(&server, storage.clone()));
    let store = SessionStore::create(provider.clone(), Arc::new(SilentNotifier));

    assert_eq!(provider.restore().await, None);
    assert_eq!(store.state(), SessionState::Anonymous);
    assert_eq!(storage.load().unwrap(), None);
}

#[tokio::test]
async fn test_restore_without_stored_session_reports_anonymous() {
    let server = MockServer::start().await;
    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));

    assert_eq!(provider.restore().await, None);

    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let _subscription = provider.observe(Arc::new(move |identity| sink.lock().push(identity)));
    assert_eq!(*reports.lock(), vec![None]);
}

#[tokio::test]
async fn test_sign_out_clears_storage() {
    let server = MockServer::start().await;
    let mut live = expired_session();
    live.expires_at = Some(Utc::now() + chrono::Duration::hours(1));
    let storage = Arc::new(MemorySessionStorage::with_session(live));
    let provider = provider(&server, storage.clone());
    provider.restore().await;

    provider.sign_out().await.unwrap();
    assert_eq!(storage.load().unwrap(), None);
    assert_eq!(provider.id_token().await.unwrap(), None);
}

#[tokio::test]
async fn test_password_reset_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts:sendOobCode"))
        .and(body_partial_json(json!({
            "requestType": "PASSWORD_RESET",
            "email": "amina@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "amina@example.com" })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));
    provider.send_password_reset("amina@example.com").await.unwrap();
}

#[tokio::test]
async fn test_federated_sign_in_is_unsupported() {
    let server = MockServer::start().await;
    let provider = provider(&server, Arc::new(MemorySessionStorage::new()));
    let err = provider.sign_in_with_federated().await.unwrap_err();
    assert_eq!(err.code, provider_codes::OPERATION_NOT_SUPPORTED);
}

#[test]
fn test_incomplete_config_rejected() {
    let result = FirebaseIdentityProvider::new(
        FirebaseConfig::new("", "academy-test"),
        Arc::new(MemorySessionStorage::new()),
    );
    assert!(result.is_err());
}
