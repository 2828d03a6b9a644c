mod common;

use common::{client, empty_context, login_body, naver_context, MockBackend, MockResponse};
use hub_session_store::{FileStorage, SessionVault};
use session_guard::{LoginFlow, LoginProvider, SessionContext, SessionState};
use std::sync::Arc;

#[tokio::test]
async fn test_naver_login_establishes_session() {
    let backend = MockBackend::start().await;
    backend.route(
        "/login/getNaverLoginInfo",
        MockResponse::json(200, login_body("u1", "t1", "j1", 3600)),
    );
    let context = empty_context();
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    let user = flow.complete_naver_login("code-1", "state-1").await.unwrap().unwrap();

    assert_eq!(user.id.as_deref(), Some("u1"));
    assert_eq!(context.state(), SessionState::LoggedIn);
    assert_eq!(context.users().provider(), Some(LoginProvider::Naver));
    assert_eq!(context.vault().get_jwt().unwrap(), Some("j1".to_string()));

    let query = backend.requests_to("/login/getNaverLoginInfo")[0].query();
    assert_eq!(query.get("code").map(String::as_str), Some("code-1"));
    assert_eq!(query.get("state").map(String::as_str), Some("state-1"));
}

#[tokio::test]
async fn test_kakao_login_sends_client_and_redirect() {
    let backend = MockBackend::start().await;
    backend.route(
        "/login/getKakaoLoginInfo",
        MockResponse::json(200, login_body("k1", "t1", "j1", 3600)),
    );
    let context = empty_context();
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    flow.complete_kakao_login("code-2").await.unwrap();

    let query = backend.requests_to("/login/getKakaoLoginInfo")[0].query();
    assert_eq!(query.get("client_id").map(String::as_str), Some("kakao-app"));
    assert_eq!(
        query.get("redirect_uri").map(String::as_str),
        Some("http://localhost:3000/login/kakao")
    );
    assert_eq!(query.get("code").map(String::as_str), Some("code-2"));
    assert_eq!(context.users().provider(), Some(LoginProvider::Kakao));
}

#[tokio::test]
async fn test_login_without_user_info_keeps_logged_out() {
    let backend = MockBackend::start().await;
    backend.route(
        "/login/getNaverLoginInfo",
        MockResponse::json(200, serde_json::json!({ "resultcode": "024", "message": "invalid code" })),
    );
    let context = empty_context();
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    let user = flow.complete_naver_login("bad", "state").await.unwrap();

    assert!(user.is_none());
    assert_eq!(context.state(), SessionState::LoggedOut);
    assert_eq!(context.vault().get_jwt().unwrap(), None);
}

#[tokio::test]
async fn test_restore_relogs_from_backend_session() {
    let backend = MockBackend::start().await;
    backend.route(
        "/login/updateKakaoLoginInfo",
        MockResponse::json(200, login_body("k1", "t9", "j9", 3600)),
    );
    let context = empty_context();
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    let user = flow.restore(LoginProvider::Kakao).await.unwrap();

    assert_eq!(user.and_then(|u| u.id), Some("k1".to_string()));
    assert_eq!(context.vault().get_jwt().unwrap(), Some("j9".to_string()));
    let requests = backend.requests_to("/login/updateKakaoLoginInfo");
    assert_eq!(requests[0].authorization, None);
    assert_eq!(requests[0].query().get("client_id").map(String::as_str), Some("kakao-app"));
}

#[tokio::test]
async fn test_restore_without_backend_session_logs_out() {
    let backend = MockBackend::start().await;
    backend.route("/login/updateNaverLoginInfo", MockResponse::raw(200, ""));
    let context = naver_context(600);
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    let user = flow.restore(LoginProvider::Naver).await.unwrap();

    assert!(user.is_none());
    assert!(!context.users().is_logged_in());
    assert_eq!(context.vault().get_jwt().unwrap(), None);
}

#[tokio::test]
async fn test_logout_revokes_and_clears() {
    let backend = MockBackend::start().await;
    backend.route(
        "/login/deleteNaverToken",
        MockResponse::json(200, serde_json::json!({ "result": "success" })),
    );
    let context = naver_context(600);
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    flow.logout().await.unwrap();

    let requests = backend.requests_to("/login/deleteNaverToken");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query().get("access_token").map(String::as_str), Some("t1"));
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer j1"));
    assert!(!context.users().is_logged_in());
    assert_eq!(context.state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn test_logout_clears_even_when_revocation_fails() {
    let backend = MockBackend::start().await;
    backend.route("/login/deleteNaverToken", MockResponse::raw(500, ""));
    let context = naver_context(600);
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    flow.logout().await.unwrap();

    assert!(!context.users().is_logged_in());
    assert_eq!(context.vault().get_access_token().unwrap(), None);
}

#[tokio::test]
async fn test_logout_without_session_skips_revocation() {
    let backend = MockBackend::start().await;
    let context = empty_context();
    let flow = LoginFlow::new(client(&backend, context.clone()), &backend.config());

    flow.logout().await.unwrap();

    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_session_survives_restart_through_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let backend = MockBackend::start().await;
    backend.route(
        "/login/getNaverLoginInfo",
        MockResponse::json(200, login_body("u1", "t1", "j1", 3600)),
    );

    {
        let vault = SessionVault::new(Box::new(FileStorage::open(&path).unwrap()));
        let context = Arc::new(SessionContext::bootstrap(vault).unwrap());
        let flow = LoginFlow::new(client(&backend, context), &backend.config());
        flow.complete_naver_login("code", "state").await.unwrap();
    }

    let vault = SessionVault::new(Box::new(FileStorage::open(&path).unwrap()));
    let context = SessionContext::bootstrap(vault).unwrap();

    assert_eq!(context.state(), SessionState::LoggedIn);
    assert_eq!(context.users().provider(), Some(LoginProvider::Naver));
    assert_eq!(context.users().user().and_then(|u| u.id), Some("u1".to_string()));
}
