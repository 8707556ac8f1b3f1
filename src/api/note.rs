use super::media::{ImageUpload, UPLOAD_FIELD, UPLOAD_PATH, upload_url};
use super::path_segment;
use super::types::{Comment, CommentPage, Id, Note, NoteDraft, NotePage};
use crate::error::{ClientError, TransportError};
use crate::transport::{Payload, RequestOptions, Transport};
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// Note, content and media endpoints.
#[derive(Clone)]
pub struct NoteApi {
    transport: Arc<Transport>,
}

impl NoteApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// `page`/`limit` pagination.
    fn page_limit(page: u32, limit: u32) -> RequestOptions {
        RequestOptions::new().query("page", page).query("limit", limit)
    }

    /// `current`/`size` pagination.
    fn current_size(page: u32, limit: u32) -> RequestOptions {
        RequestOptions::new().query("current", page).query("size", limit)
    }

    pub async fn recommended(&self, page: u32, limit: u32) -> Result<NotePage, ClientError> {
        const ENDPOINT: &str = "/notes/recommend";
        let payload = self
            .transport
            .get(ENDPOINT, Self::page_limit(page, limit))
            .await?;
        Ok(payload.into_data(ENDPOINT)?)
    }

    pub async fn following(&self, page: u32, limit: u32) -> Result<NotePage, ClientError> {
        const ENDPOINT: &str = "/content/getSelfFollowerFeed";
        let payload = self
            .transport
            .get(ENDPOINT, Self::current_size(page, limit))
            .await?;
        Ok(payload.into_data(ENDPOINT)?)
    }

    /// Raw detail, or `None` when the backend answered with an empty body.
    /// Field renaming for the detail view happens in the feed store.
    pub async fn detail(&self, note_id: &Id) -> Result<Option<Note>, ClientError> {
        let path = format!("/content/getContentDetail/{}", path_segment(note_id.as_str())?);
        match self.transport.get(&path, RequestOptions::new()).await? {
            Payload::Empty => Ok(None),
            payload => Ok(Some(payload.decode(&path)?)),
        }
    }

    pub async fn publish(&self, draft: &NoteDraft) -> Result<Value, ClientError> {
        const ENDPOINT: &str = "/notes";
        let body = serde_json::to_value(draft).map_err(anyhow::Error::from)?;
        let payload = self.transport.post_json(ENDPOINT, body).await?;
        Ok(payload
            .into_envelope::<Value>(ENDPOINT)?
            .ensure_success(ENDPOINT)?
            .unwrap_or(Value::Null))
    }

    pub async fn create_content(&self, draft: &NoteDraft) -> Result<Payload, ClientError> {
        let body = serde_json::to_value(draft).map_err(anyhow::Error::from)?;
        self.transport
            .post_json("/content/createContent", body)
            .await
    }

    /// Uploads one image and returns its public URL.
    pub async fn upload_image(&self, upload: ImageUpload) -> Result<String, ClientError> {
        let ImageUpload {
            file_name,
            mime_type,
            bytes,
        } = upload;
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(&mime_type)
            .map_err(TransportError::from)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        debug!(file = %file_name, mime = %mime_type, bytes = size, "media.upload");
        let payload = self
            .transport
            .post(UPLOAD_PATH, RequestOptions::new().multipart(form))
            .await?;
        upload_url(payload).map_err(|error| {
            warn!(file = %file_name, error = %error, "media.upload.unrecognized_response");
            error.into()
        })
    }

    /// Returns whatever the backend reports (the new like count).
    pub async fn like(&self, note_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/content/like/{}", path_segment(note_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    pub async fn unlike(&self, note_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/content/unlike/{}", path_segment(note_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    pub async fn collect(&self, note_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/notes/{}/collect", path_segment(note_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    pub async fn uncollect(&self, note_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/notes/{}/uncollect", path_segment(note_id.as_str())?);
        self.transport.post(&path, RequestOptions::new()).await
    }

    /// Posts a comment and returns the created comment.
    pub async fn comment(&self, note_id: &Id, content: &str) -> Result<Comment, ClientError> {
        let path = format!("/notes/{}/comment", path_segment(note_id.as_str())?);
        let payload = self
            .transport
            .post_json(&path, json!({ "content": content }))
            .await?;
        Ok(payload.into_data(&path)?)
    }

    pub async fn comments(
        &self,
        note_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<CommentPage, ClientError> {
        let path = format!("/notes/{}/comments", path_segment(note_id.as_str())?);
        let payload = self
            .transport
            .get(&path, Self::page_limit(page, limit))
            .await?;
        Ok(payload.into_data(&path)?)
    }

    pub async fn delete(&self, note_id: &Id) -> Result<Payload, ClientError> {
        let path = format!("/notes/{}", path_segment(note_id.as_str())?);
        self.transport.delete(&path).await
    }

    /// The signed-in user's own posts; the backend infers the user from the token.
    pub async fn user_notes(&self, page: u32, limit: u32) -> Result<Payload, ClientError> {
        self.transport
            .get("/content/getSelfPosts", Self::current_size(page, limit))
            .await
    }

    pub async fn user_collections(
        &self,
        user_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<Payload, ClientError> {
        let path = format!("/notes/collections/{}", path_segment(user_id.as_str())?);
        self.transport
            .get(&path, Self::page_limit(page, limit))
            .await
    }

    pub async fn user_likes(
        &self,
        user_id: &Id,
        page: u32,
        limit: u32,
    ) -> Result<Payload, ClientError> {
        let path = format!("/notes/likes/{}", path_segment(user_id.as_str())?);
        self.transport
            .get(&path, Self::page_limit(page, limit))
            .await
    }
}
