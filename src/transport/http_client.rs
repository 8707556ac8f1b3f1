use crate::config::ApiConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub fn build_http_client(config: &ApiConfig) -> Client {
    build_http_client_with_timeouts(config.timeout_secs, config.connect_timeout_secs)
}

pub fn build_http_client_with_timeouts(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|error| {
            warn!(error = %error, "http_client.build_failed; using defaults");
            Client::new()
        })
}
