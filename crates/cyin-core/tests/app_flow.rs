use std::time::Duration;

use cyin_core::auth::session::{EMAIL_KEY, ROLE_KEY, TOKEN_KEY};
use cyin_core::{
    ApiClient, ApiError, App, Identity, KeyValueStore, Location, MemoryStore, Operation,
    SessionStore, WorkStatus,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app_with(server: &MockServer, storage: Box<dyn KeyValueStore>) -> App {
    let api = ApiClient::new(&server.uri()).expect("client");
    let mut session = SessionStore::new(storage);
    session.initialize();
    App::new(api, session)
}

fn anonymous_app(server: &MockServer) -> App {
    app_with(server, Box::new(MemoryStore::new()))
}

fn logged_in_storage() -> Box<dyn KeyValueStore> {
    let mut store = MemoryStore::new();
    store.set(TOKEN_KEY, "t1").unwrap();
    store.set(EMAIL_KEY, "a@x.com").unwrap();
    store.set(ROLE_KEY, "EMPLOYEE").unwrap();
    Box::new(store)
}

async fn mount_login(server: &MockServer, data: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": data
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_stores_identity_in_session_and_storage() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"status": true, "role": "EMPLOYEE", "token": "t1"})).await;

    let mut app = anonymous_app(&server);
    let identity = app.login("a@x.com", "pw").await.unwrap();

    let expected = Identity {
        email: "a@x.com".to_string(),
        role: "EMPLOYEE".to_string(),
        token: "t1".to_string(),
    };
    assert_eq!(identity, expected);
    assert!(app.session().is_authenticated());
    assert_eq!(app.session().identity(), Some(&expected));

    let storage = app.session().storage();
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t1"));
    assert_eq!(storage.get(EMAIL_KEY).unwrap().as_deref(), Some("a@x.com"));
    assert_eq!(storage.get(ROLE_KEY).unwrap().as_deref(), Some("EMPLOYEE"));
    assert!(!app.is_busy(Operation::Login));
}

#[tokio::test]
async fn login_survives_reload() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"status": true, "role": "ADMIN", "token": "t2"})).await;

    let mut app = anonymous_app(&server);
    let identity = app.login("boss@x.com", "pw").await.unwrap();

    let mut reloaded = SessionStore::new(app.into_session().into_storage());
    assert!(reloaded.initialize());
    assert_eq!(reloaded.identity(), Some(&identity));
}

#[tokio::test]
async fn login_refused_in_payload_leaves_session_anonymous() {
    let server = MockServer::start().await;
    mount_login(&server, json!({"status": false, "role": "", "token": ""})).await;

    let mut app = anonymous_app(&server);
    let err = app.login("a@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().storage().get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn login_sends_long_password_as_typed() {
    let server = MockServer::start().await;
    let password = "a".repeat(129);
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "a@x.com", "password": &password})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"status": true, "role": "EMPLOYEE", "token": "t1"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = anonymous_app(&server);
    app.login("a@x.com", &password).await.unwrap();
    assert!(app.session().is_authenticated());

    // Only sign-up and reset apply the length limit
    let err = app
        .sign_up("Ann", "a@x.com", &password, "EMPLOYEE")
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn login_network_failure_keeps_previous_session() {
    let api = ApiClient::new("http://127.0.0.1:1").unwrap();
    let mut session = SessionStore::new(logged_in_storage());
    session.initialize();
    let mut app = App::new(api, session);

    let err = app.login("other@x.com", "pw").await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(app.session().identity().unwrap().email, "a@x.com");
    assert!(!app.is_busy(Operation::Login));
}

#[tokio::test]
async fn logout_clears_everything() {
    let server = MockServer::start().await;
    let mut app = app_with(&server, logged_in_storage());
    assert!(app.session().is_authenticated());

    app.logout();
    assert!(!app.session().is_authenticated());
    let storage = app.session().storage();
    for key in [TOKEN_KEY, EMAIL_KEY, ROLE_KEY] {
        assert_eq!(storage.get(key).unwrap(), None);
    }

    // Logging out again is harmless
    app.logout();
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn log_event_attaches_session_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/event"))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": true,
            "data": {"status": "breaking"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with(&server, logged_in_storage());
    let recorded = app
        .log_event(WorkStatus::Breaking, Location::new(6.9271, 79.8612))
        .await
        .unwrap();
    assert_eq!(recorded, "breaking");
    assert!(!app.is_busy(Operation::LogEvent));
}

#[tokio::test]
async fn log_event_without_session_is_still_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/event"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "status": false,
            "message": "Authentication required"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = anonymous_app(&server);
    let err = app
        .log_event(WorkStatus::Moving, Location::new(1.0, 2.0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Authentication required");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn blank_work_description_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/work"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let app = app_with(&server, logged_in_storage());
    let err = app.log_work(" \n\t").await.unwrap_err();
    assert!(err.is_validation());
    assert!(!app.is_busy(Operation::LogWork));
}

#[tokio::test]
async fn reset_password_validation_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(0)
        .mount(&server)
        .await;

    let app = anonymous_app(&server);

    let err = app
        .reset_password("https://cyin.example/reset-password?token=abc", "one", "two")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Passwords do not match");

    let err = app
        .reset_password("https://cyin.example/reset-password", "same", "same")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid token");
    assert!(!app.is_busy(Operation::ResetPassword));
}

#[tokio::test]
async fn reset_password_uses_token_from_link() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/reset-password"))
        .and(body_json(json!({"token": "abc", "newPassword": "same"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true})))
        .expect(1)
        .mount(&server)
        .await;

    let app = anonymous_app(&server);
    app.reset_password("https://cyin.example/reset-password?token=abc", "same", "same")
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_submission_is_refused_while_in_flight() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/work"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": true, "data": {"description": "first"}}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app_with(&server, logged_in_storage());
    let (first, second) = tokio::join!(app.log_work("first"), app.log_work("second"));

    assert_eq!(first.unwrap().description, "first");
    assert!(matches!(second, Err(ApiError::Busy(_))));
    assert!(!app.is_busy(Operation::LogWork));
}

#[tokio::test]
async fn flag_released_after_api_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let app = anonymous_app(&server);
    assert!(app.forgot_password("a@x.com").await.is_err());
    assert!(!app.is_busy(Operation::ForgotPassword));

    // Manual retry goes through
    let err = app.forgot_password("a@x.com").await.unwrap_err();
    assert_eq!(err.to_string(), "Forgot password failed");
}

#[tokio::test]
async fn sign_up_validates_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers/signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": true, "data": null})))
        .expect(1)
        .mount(&server)
        .await;

    let app = anonymous_app(&server);
    let err = app.sign_up("", "a@x.com", "pw", "EMPLOYEE").await.unwrap_err();
    assert!(err.is_validation());

    let data = app.sign_up(" Ann ", "a@x.com", "pw", "EMPLOYEE").await.unwrap();
    assert!(data.is_null());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["employeeName"], "Ann");
}
