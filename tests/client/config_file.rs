use rednote::config::AuthStyle;
use rednote::storage::{FileStorage, LocalStorage, TOKEN_KEY};
use rednote::{AppContext, Config};
use serde_json::json;
use std::fs;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn edited_config_file_is_picked_up() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[api]
base_url = "https://notes.example.com/api"
auth_style = "bearer"

[feed]
page_size = 25
"#,
    )
    .expect("write config");

    let config = Config::load_or_init_at(&config_path).expect("load config");

    assert_eq!(config.api.auth_style, AuthStyle::Bearer);
    assert_eq!(config.feed.page_size, 25);
    assert_eq!(config.feed.comment_page_size, 20);
    assert_eq!(config.api.timeout_secs, 10);
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "[feed]\npage_size = 0\n").expect("write config");

    let err = Config::load_or_init_at(&config_path).expect_err("zero page size");
    assert!(format!("{err:#}").contains("page"));
}

#[tokio::test]
async fn bearer_style_prefixes_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/getUser"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": {"id": 1}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = crate::backend::config_for(&server, &dir);
    config.api.auth_style = AuthStyle::Bearer;
    FileStorage::open(config.storage_path())
        .expect("storage")
        .set(TOKEN_KEY, "tok")
        .expect("seed token");

    let app = AppContext::from_config(config).expect("app");
    let info = app.session_store.fetch_user_info().await.expect("user info");
    assert_eq!(info.get("id"), Some(&json!(1)));
}
