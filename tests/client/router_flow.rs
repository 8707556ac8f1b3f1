use crate::backend::harness;
use rednote::router::{Resolution, View};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn guard_follows_session_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("tok"))
        .mount(&server)
        .await;

    let h = harness(&server);
    assert_eq!(
        h.app.navigate("/note/9?from=feed"),
        Resolution::Redirect {
            location: "/login?redirect=%2Fnote%2F9%3Ffrom%3Dfeed".into()
        }
    );

    assert!(h.app.session_store.login("13800000000", "1111").await);
    match h.app.navigate("/note/9?from=feed") {
        Resolution::Render(route) => {
            assert_eq!(route.view, View::NoteDetail);
            assert_eq!(route.params.get("id").map(String::as_str), Some("9"));
        }
        Resolution::Redirect { location } => panic!("still redirected to {location}"),
    }
    assert_eq!(
        h.app.history.current().as_deref(),
        Some("/note/9?from=feed")
    );
}

#[tokio::test]
async fn login_pages_are_public() {
    let server = MockServer::start().await;
    let h = harness(&server);
    for (location, view) in [
        ("/login", View::PhoneLogin),
        ("/login/code", View::CodeVerify),
        ("/register", View::Register),
    ] {
        match h.app.navigate(location) {
            Resolution::Render(route) => assert_eq!(route.view, view),
            Resolution::Redirect { location } => panic!("unexpected redirect to {location}"),
        }
    }
}
