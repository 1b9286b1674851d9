mod common;

use logdash_api::{
    ApiError, LOGIN_FAILED, NewAccount, REGISTRATION_FAILED, SearchQuery, Session, TokenStore,
};
use logdash_types::Role;

use common::{Stub, client, spawn};

fn session_in(dir: &tempfile::TempDir, base_url: &str) -> (Session, TokenStore) {
    let store = TokenStore::new(dir.path().join("session.json"));
    (Session::restore(client(base_url), store.clone()), store)
}

#[tokio::test]
async fn login_stores_token_and_resolves_user() {
    let base_url = spawn(Stub::new(&["completed"])).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, store) = session_in(&dir, &base_url);

    session.login("alice", "wonderland").await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.client().token(), Some("token-alice"));
    // No user in the login body, so it came from /auth/me
    let user = session.user().unwrap();
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert!(session.error().is_none());

    let stored = store.load().unwrap();
    assert_eq!(stored.token, "token-alice");
    assert_eq!(stored.user.map(|u| u.username), Some("alice".to_string()));
}

#[tokio::test]
async fn login_uses_inline_user_when_present() {
    let base_url = spawn(Stub::new(&["completed"])).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_in(&dir, &base_url);

    session.login("bob", "builder").await.unwrap();
    assert_eq!(session.user().map(|u| u.id), Some(2));
}

#[tokio::test]
async fn login_rejected_shows_server_detail() {
    let stub = Stub::new(&["completed"]);
    let base_url = spawn(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, store) = session_in(&dir, &base_url);

    let err = session.login("alice", "wrong").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(session.error(), Some("Invalid credentials"));
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
    assert!(store.load().is_none());
    assert_eq!(stub.recorded.lock().unwrap().logins.len(), 1);
}

#[tokio::test]
async fn login_unreachable_server_uses_fallback_banner() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_in(&dir, &format!("http://{addr}"));

    let err = session.login("alice", "wonderland").await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
    assert_eq!(session.error(), Some(LOGIN_FAILED));
}

#[tokio::test]
async fn login_form_encodes_special_characters() {
    let stub = Stub::new(&["completed"]);
    let base_url = spawn(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_in(&dir, &base_url);

    session.login("carol", "p&ss=w rd").await.unwrap();

    let logins = &stub.recorded.lock().unwrap().logins;
    assert_eq!(logins[0], ("carol".to_string(), "p&ss=w rd".to_string()));
}

#[tokio::test]
async fn register_then_signed_in() {
    let stub = Stub::new(&["completed"]);
    let base_url = spawn(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, store) = session_in(&dir, &base_url);

    let account = NewAccount {
        username: "dave".to_string(),
        email: "dave@example.com".to_string(),
        password: "hunter22".to_string(),
        role: Role::Admin,
    };
    session.register(&account).await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user().map(|u| u.username.as_str()), Some("dave"));
    assert_eq!(store.load().map(|s| s.token), Some("token-dave".to_string()));
    // Registration is followed by exactly one login
    assert_eq!(stub.recorded.lock().unwrap().logins.len(), 1);
}

#[tokio::test]
async fn register_conflict_reports_detail() {
    let stub = Stub::new(&["completed"]);
    let base_url = spawn(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_in(&dir, &base_url);

    let account = NewAccount {
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password: "whatever".to_string(),
        role: Role::Viewer,
    };
    session.register(&account).await.unwrap_err();

    assert_eq!(session.error(), Some("Username already registered"));
    assert!(!session.is_authenticated());
    assert!(stub.recorded.lock().unwrap().logins.is_empty());
}

#[tokio::test]
async fn register_validation_error_lists_messages() {
    let base_url = spawn(Stub::new(&["completed"])).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session_in(&dir, &base_url);

    let account = NewAccount {
        username: "erin".to_string(),
        email: "not-an-email".to_string(),
        password: "secret".to_string(),
        role: Role::Viewer,
    };
    let err = session.register(&account).await.unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert_eq!(session.error(), Some("value is not a valid email address"));
    assert_ne!(session.error(), Some(REGISTRATION_FAILED));
}

#[tokio::test]
async fn logout_removes_session_file_and_token() {
    let base_url = spawn(Stub::new(&["completed"])).await;
    let dir = tempfile::tempdir().unwrap();
    let (mut session, store) = session_in(&dir, &base_url);

    session.login("alice", "wonderland").await.unwrap();
    assert!(store.load().is_some());

    session.logout();

    assert!(!session.is_authenticated());
    assert!(store.load().is_none());
    assert!(!store.path().exists());

    let err = session
        .client()
        .search(&SearchQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotAuthenticated));
}

#[tokio::test]
async fn restored_session_is_used_for_requests() {
    let stub = Stub::new(&["completed"]);
    let base_url = spawn(stub.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    {
        let (mut session, _) = session_in(&dir, &base_url);
        session.login("alice", "wonderland").await.unwrap();
    }

    let (session, _) = session_in(&dir, &base_url);
    assert!(session.is_authenticated());
    session.client().search(&SearchQuery::default()).await.unwrap();

    let recorded = stub.recorded.lock().unwrap();
    assert_eq!(recorded.search_auth, vec![Some("token-alice".to_string())]);
}

#[tokio::test]
async fn stale_token_is_reported_as_unauthorized() {
    let dir = tempfile::tempdir().unwrap();
    let base_url = spawn(Stub::new(&["completed"])).await;
    let mut client = client(&base_url);
    client.set_token("revoked");

    let err = client.me().await.unwrap_err();
    assert!(err.is_unauthorized());

    let (mut session, store) = session_in(&dir, &base_url);
    session.expire();
    assert!(store.load().is_none());
    assert!(session.error().is_some());
}
