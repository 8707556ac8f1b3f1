use crate::config::Config;
use crate::session::{SessionState, SessionStore};

pub fn render_status(config: &Config, session: &SessionStore) -> String {
    let mut lines = vec![
        "◆ RedNote".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        format!("Storage     {}", config.storage_path().display()),
        String::new(),
        format!("  API           {}", config.api.base_url),
        format!("  Auth header   {}", config.api.auth_style),
        format!(
            "  Timeouts      {}s (connect {}s)",
            config.api.timeout_secs, config.api.connect_timeout_secs
        ),
        format!(
            "  Page size     {} notes, {} comments",
            config.feed.page_size, config.feed.comment_page_size
        ),
        String::new(),
        "Session".to_string(),
        format!("  State         {}", session_label(&session.state())),
    ];

    if let Some(info) = session.user_info() {
        let name = ["nickname", "username", "name"]
            .iter()
            .find_map(|key| info.get(*key).and_then(serde_json::Value::as_str))
            .unwrap_or("(unnamed)");
        lines.push(format!("  User          {name}"));
    }

    lines.join("\n")
}

fn session_label(state: &SessionState) -> String {
    match state {
        SessionState::LoggedOut => "✗ logged out".into(),
        SessionState::CodeSent { phone } => format!("… code sent to {phone}"),
        SessionState::LoggedIn { phone, .. } if phone.is_empty() => "✓ logged in".into(),
        SessionState::LoggedIn { phone, .. } => format!("✓ logged in as {phone}"),
    }
}
