//! The single configured HTTP client every domain call goes through.
//!
//! Request side: resolve the endpoint against the base URL and attach the
//! session token. Response side: strip the HTTP layer down to a [`Payload`],
//! and on `401 Unauthorized` tear the session down and send the client to
//! the login entry before rejecting.

mod http_client;
mod payload;

pub use http_client::{build_http_client, build_http_client_with_timeouts};
pub use payload::{Envelope, Payload};

use crate::config::{ApiConfig, AuthStyle};
use crate::error::{ClientError, TransportError};
use crate::router::{LOGIN_PATH, Navigator};
use crate::session::SessionHandle;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    None,
    Json(Value),
    Multipart(reqwest::multipart::Form),
}

#[derive(Debug, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }
}

pub struct Transport {
    client: Client,
    base_url: String,
    auth_style: AuthStyle,
    session: SessionHandle,
    navigator: Arc<dyn Navigator>,
}

impl Transport {
    pub fn new(config: &ApiConfig, session: SessionHandle, navigator: Arc<dyn Navigator>) -> Self {
        Self::with_client(build_http_client(config), config, session, navigator)
    }

    pub fn with_client(
        client: Client,
        config: &ApiConfig,
        session: SessionHandle,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            auth_style: config.auth_style,
            session,
            navigator,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn apply_auth_header(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => {
                let value = match self.auth_style {
                    AuthStyle::Raw => token,
                    AuthStyle::Bearer => format!("Bearer {token}"),
                };
                request.header(AUTHORIZATION, value)
            }
            None => request,
        }
    }

    fn handle_unauthorized(&self, path: &str) {
        let had_token = self.session.clear();
        warn!(path = %path, had_token = had_token, "transport.unauthorized");
        self.navigator.redirect(LOGIN_PATH);
    }

    /// One request, one attempt. Every non-2xx status is a failure; 401 also
    /// ends the session.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Payload, ClientError> {
        let url = self.endpoint(path);
        let mut request = self.client.request(method.clone(), &url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        request = match options.body {
            RequestBody::None => request,
            RequestBody::Json(body) => request.json(&body),
            RequestBody::Multipart(form) => request.multipart(form),
        };
        request = self.apply_auth_header(request);

        debug!(method = %method, path = %path, "transport.request");
        let response = request.send().await.map_err(TransportError::from)?;
        let status = response.status();
        debug!(method = %method, path = %path, status = status.as_u16(), "transport.response");

        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path);
            return Err(TransportError::Unauthorized.into());
        }

        let body = response.text().await.map_err(TransportError::from)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            }
            .into());
        }

        Ok(Payload::parse(&body))
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Payload, ClientError> {
        self.send(Method::GET, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<Payload, ClientError> {
        self.send(Method::POST, path, options).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> Result<Payload, ClientError> {
        self.post(path, RequestOptions::new().json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Payload, ClientError> {
        self.send(Method::DELETE, path, RequestOptions::new()).await
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push('…');
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::router::History;
    use crate::storage::{LocalStorage, MemoryStorage, PHONE_KEY, TOKEN_KEY};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        transport: Transport,
        storage: Arc<MemoryStorage>,
        history: Arc<History>,
    }

    fn fixture(server: &MockServer, entries: &[(&str, &str)], auth_style: AuthStyle) -> Fixture {
        let storage = Arc::new(MemoryStorage::with_entries(entries.iter().copied()));
        let session = SessionHandle::restore(storage.clone()).unwrap();
        let history = Arc::new(History::new());
        let config = ApiConfig {
            base_url: format!("{}/api/", server.uri()),
            auth_style,
            ..ApiConfig::default()
        };
        let transport = Transport::new(&config, session, history.clone());
        Fixture {
            transport,
            storage,
            history,
        }
    }

    #[tokio::test]
    async fn attaches_raw_token_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/getUser"))
            .and(header("authorization", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, &[(TOKEN_KEY, "tok-1")], AuthStyle::Raw);
        let payload = fx
            .transport
            .get("/user/getUser", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Json(json!({"code": 0, "data": {}})));
    }

    #[tokio::test]
    async fn bearer_style_prefixes_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/user/getUser"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, &[(TOKEN_KEY, "tok-1")], AuthStyle::Bearer);
        let payload = fx
            .transport
            .get("/user/getUser", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Text("ok".into()));
    }

    #[tokio::test]
    async fn omits_header_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let fx = fixture(&server, &[], AuthStyle::Raw);
        let payload = fx
            .transport
            .get("/notes/recommend", RequestOptions::new())
            .await
            .unwrap();
        assert_eq!(payload, Payload::Empty);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn sends_query_and_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/question/pageQuestionList"))
            .and(query_param("page", "2"))
            .and(body_json(json!({"tag": "rust"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, &[], AuthStyle::Raw);
        fx.transport
            .post(
                "question/pageQuestionList",
                RequestOptions::new()
                    .query("page", 2)
                    .json(json!({"tag": "rust"})),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unauthorized_clears_session_and_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let fx = fixture(
            &server,
            &[(TOKEN_KEY, "stale"), (PHONE_KEY, "13800000000")],
            AuthStyle::Raw,
        );
        let err = fx
            .transport
            .get("/content/getSelfFollowerFeed", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(fx.storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(fx.storage.get(PHONE_KEY).unwrap(), None);
        assert!(!fx.transport.session().is_authenticated());
        assert_eq!(fx.history.entries(), vec!["/login"]);
    }

    #[tokio::test]
    async fn server_errors_pass_through_without_touching_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let fx = fixture(&server, &[(TOKEN_KEY, "tok")], AuthStyle::Raw);
        let err = fx
            .transport
            .get("/notes/recommend", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("maintenance"));
        assert!(fx.transport.session().is_authenticated());
        assert!(fx.history.entries().is_empty());
    }

    #[tokio::test]
    async fn connection_failure_is_network_error() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionHandle::restore(storage).unwrap();
        let config = ApiConfig {
            base_url: "http://127.0.0.1:9/api".into(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
            ..ApiConfig::default()
        };
        let transport = Transport::new(&config, session, Arc::new(History::new()));

        let err = transport
            .get("/notes/recommend", RequestOptions::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn endpoint_joins_paths() {
        let session = SessionHandle::restore(Arc::new(MemoryStorage::new())).unwrap();
        let config = ApiConfig {
            base_url: "http://host/api/".into(),
            ..ApiConfig::default()
        };
        let transport = Transport::new(&config, session, Arc::new(History::new()));
        assert_eq!(transport.endpoint("/user/login"), "http://host/api/user/login");
        assert_eq!(transport.endpoint("user/login"), "http://host/api/user/login");
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(MAX_ERROR_BODY_CHARS + 10);
        let truncated = truncate_body(&body);
        assert_eq!(truncated.chars().count(), MAX_ERROR_BODY_CHARS + 1);
        assert!(truncated.ends_with('…'));
    }
}
