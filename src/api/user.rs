use super::path_segment;
use super::types::{Id, RegisterRequest, UserInfo};
use crate::error::{ApiError, ClientError};
use crate::transport::{Payload, RequestOptions, Transport};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// User-domain endpoints.
#[derive(Clone)]
pub struct UserApi {
    transport: Arc<Transport>,
}

impl UserApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Exchanges phone and verification code for a session token.
    ///
    /// Only a bare string body counts as a token; any other shape is
    /// [`ApiError::LoginRejected`]. Persisting the token is the caller's job.
    pub async fn login(&self, phone: &str, code: &str) -> Result<String, ClientError> {
        let payload = self
            .transport
            .post_json("/user/login", json!({ "phone": phone, "code": code }))
            .await?;
        match payload {
            Payload::Text(token) if !token.is_empty() => Ok(token),
            other => {
                debug!(response = ?other, "user.login.rejected");
                Err(ApiError::LoginRejected.into())
            }
        }
    }

    pub async fn send_verification_code(&self, phone: &str) -> Result<Payload, ClientError> {
        let path = format!("/user/sendCode/{}", path_segment(phone)?);
        self.transport.get(&path, RequestOptions::new()).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<Value>, ClientError> {
        const ENDPOINT: &str = "/user/register";
        let body = serde_json::to_value(request).map_err(anyhow::Error::from)?;
        let payload = self.transport.post_json(ENDPOINT, body).await?;
        Ok(payload
            .into_envelope::<Value>(ENDPOINT)?
            .ensure_success(ENDPOINT)?)
    }

    pub async fn get_user_info(&self) -> Result<UserInfo, ClientError> {
        const ENDPOINT: &str = "/user/getUser";
        let payload = self.transport.get(ENDPOINT, RequestOptions::new()).await?;
        Ok(payload.into_data(ENDPOINT)?)
    }

    pub async fn get_user_feeds(
        &self,
        user_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<Payload, ClientError> {
        let path = format!("/user/{}/feeds", path_segment(user_id.as_str())?);
        self.transport
            .get(
                &path,
                RequestOptions::new().query("page", page).query("limit", limit),
            )
            .await
    }

    pub async fn follow_user(&self, user_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/user/follow/{}", path_segment(user_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    pub async fn unfollow_user(&self, user_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/user/unfollow/{}", path_segment(user_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    pub async fn get_followings(
        &self,
        user_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<Payload, ClientError> {
        let path = format!("/user/{}/followings", path_segment(user_id.as_str())?);
        self.transport
            .get(
                &path,
                RequestOptions::new().query("page", page).query("limit", limit),
            )
            .await
    }

    pub async fn get_followers(
        &self,
        user_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<Payload, ClientError> {
        let path = format!("/user/{}/followers", path_segment(user_id.as_str())?);
        self.transport
            .get(
                &path,
                RequestOptions::new().query("page", page).query("limit", limit),
            )
            .await
    }
}
