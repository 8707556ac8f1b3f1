#![allow(dead_code)]

use std::sync::Arc;

use rednote::notify::NoticeLog;
use rednote::storage::{FileStorage, LocalStorage};
use rednote::{AppContext, Config};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::MockServer;

/// An app wired against a mock backend, persisting to a temp directory.
pub struct Harness {
    pub app: AppContext,
    pub notices: Arc<NoticeLog>,
    pub storage: Arc<FileStorage>,
    pub dir: TempDir,
}

pub fn config_for(server: &MockServer, dir: &TempDir) -> Config {
    let mut config = Config {
        config_path: dir.path().join("config.toml"),
        ..Config::default()
    };
    config.api.base_url = format!("{}/api", server.uri());
    config
}

pub fn harness(server: &MockServer) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    reopen(server, dir)
}

/// Rebuilds the app over the same storage directory, as a restart would.
pub fn reopen(server: &MockServer, dir: TempDir) -> Harness {
    let config = config_for(server, &dir);
    let storage = Arc::new(FileStorage::open(config.storage_path()).expect("open storage"));
    let notices = Arc::new(NoticeLog::new());
    let app = AppContext::with_parts(
        config,
        storage.clone() as Arc<dyn LocalStorage>,
        notices.clone(),
    )
    .expect("app context");
    Harness {
        app,
        notices,
        storage,
        dir,
    }
}

pub fn notes_page(first_id: u64, count: u64, total_pages: u32) -> Value {
    let list: Vec<Value> = (first_id..first_id + count)
        .map(|id| json!({"id": id, "title": format!("note {id}"), "likeCount": 3}))
        .collect();
    json!({"code": 0, "message": "ok", "data": {"list": list, "totalPages": total_pages}})
}
