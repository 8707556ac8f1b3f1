use crate::backend::{harness, notes_page, reopen};
use rednote::ErrorKind;
use rednote::router::LOGIN_PATH;
use rednote::session::SessionState;
use rednote::storage::{LocalStorage, PHONE_KEY, TOKEN_KEY, USER_INFO_KEY};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PHONE: &str = "13800000000";

async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/user/sendCode/{PHONE}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("sent")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(json!({"phone": PHONE, "code": "2468"})))
        .respond_with(ResponseTemplate::new(200).set_body_string("session-token"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_survives_restart() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/user/getUser"))
        .and(header("authorization", "session-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": {"nickname": "kai"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    assert!(h.app.session_store.send_code(PHONE).await);
    assert_eq!(
        h.app.session_store.state(),
        SessionState::CodeSent {
            phone: PHONE.into()
        }
    );
    assert!(h.app.session_store.login(PHONE, "2468").await);
    h.app
        .session_store
        .fetch_user_info()
        .await
        .expect("user info");

    let restarted = reopen(&server, h.dir);
    let store = &restarted.app.session_store;
    assert!(store.is_logged_in());
    assert_eq!(store.phone().as_deref(), Some(PHONE));
    assert_eq!(
        store.user_info().and_then(|info| info.get("nickname").cloned()),
        Some(json!("kai"))
    );
}

#[tokio::test]
async fn rejected_login_persists_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 1, "message": "code expired"})),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    assert!(!h.app.session_store.login(PHONE, "0000").await);

    assert_eq!(h.app.session_store.state(), SessionState::LoggedOut);
    assert_eq!(h.storage.get(TOKEN_KEY).expect("read token"), None);
    assert_eq!(h.notices.errors().len(), 1);
}

#[tokio::test]
async fn unauthorized_feed_request_ends_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/notes/recommend"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    assert!(h.app.session_store.login(PHONE, "2468").await);

    let err = h.app.feed.fetch_notes(1).await.expect_err("401");

    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(h.app.session_store.state(), SessionState::LoggedOut);
    for key in [TOKEN_KEY, PHONE_KEY, USER_INFO_KEY] {
        assert_eq!(h.storage.get(key).expect("read"), None, "{key} should be cleared");
    }
    assert_eq!(h.app.history.current().as_deref(), Some(LOGIN_PATH));
    assert!(h.app.feed.display_notes().is_empty());
}

#[tokio::test]
async fn logout_then_requests_go_out_without_token() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/notes/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notes_page(1, 2, 1)))
        .mount(&server)
        .await;

    let h = harness(&server);
    assert!(h.app.session_store.login(PHONE, "2468").await);
    h.app.session_store.logout();
    h.app.feed.fetch_notes(1).await.expect("public feed");

    let requests = server.received_requests().await.expect("recorded requests");
    let feed_request = requests
        .iter()
        .find(|request| request.url.path() == "/api/notes/recommend")
        .expect("feed request");
    assert!(feed_request.headers.get("authorization").is_none());
}
