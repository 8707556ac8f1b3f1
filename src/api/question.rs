use super::path_segment;
use super::types::{Id, QuestionDraft, QuestionQuery};
use crate::error::ClientError;
use crate::transport::{Payload, RequestOptions, Transport};
use std::sync::Arc;

/// Question bank endpoints. Response shapes are passed through untouched.
#[derive(Clone)]
pub struct QuestionApi {
    transport: Arc<Transport>,
}

impl QuestionApi {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// The question bank shares the recommendation endpoint with notes.
    pub async fn question_bank(&self, page: u32, limit: u32) -> Result<Payload, ClientError> {
        self.transport
            .get(
                "/notes/recommend",
                RequestOptions::new()
                    .query("page", page)
                    .query("limit", limit)
                    .query("type", "question"),
            )
            .await
    }

    pub async fn create_question(&self, draft: &QuestionDraft) -> Result<Payload, ClientError> {
        let body = serde_json::to_value(draft).map_err(anyhow::Error::from)?;
        self.transport
            .post_json("/question/createQuestion", body)
            .await
    }

    pub async fn page_question_list(&self, query: &QuestionQuery) -> Result<Payload, ClientError> {
        let body = serde_json::to_value(query).map_err(anyhow::Error::from)?;
        self.transport
            .post_json("/question/pageQuestionList", body)
            .await
    }

    pub async fn question_detail(&self, question_id: &Id) -> Result<Payload, ClientError> {
        let path = format!(
            "/question/getQuestionDetail/{}",
            path_segment(question_id.as_str())?
        );
        self.transport.get(&path, RequestOptions::new()).await
    }

    pub async fn tags(&self) -> Result<Payload, ClientError> {
        self.transport
            .get("/question/getTags", RequestOptions::new())
            .await
    }

    pub async fn by_tag(&self, tag_id: &Id, page: u32, size: u32) -> Result<Payload, ClientError> {
        let path = format!("/question/getByTag/{}", path_segment(tag_id.as_str())?);
        self.transport
            .get(
                &path,
                RequestOptions::new().query("page", page).query("size", size),
            )
            .await
    }

    pub async fn next(&self, current_id: &Id, tag_id: &Id) -> Result<Payload, ClientError> {
        self.step("/question/getNext", current_id, tag_id).await
    }

    pub async fn prev(&self, current_id: &Id, tag_id: &Id) -> Result<Payload, ClientError> {
        self.step("/question/getPrev", current_id, tag_id).await
    }

    async fn step(&self, endpoint: &str, current_id: &Id, tag_id: &Id) -> Result<Payload, ClientError> {
        self.transport
            .get(
                endpoint,
                RequestOptions::new()
                    .query("currentId", current_id)
                    .query("tagId", tag_id),
            )
            .await
    }

    pub async fn recommended(&self) -> Result<Payload, ClientError> {
        self.transport
            .get("/recommend/questions", RequestOptions::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::router::History;
    use crate::session::SessionHandle;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn question_api(server: &MockServer) -> QuestionApi {
        let session = SessionHandle::restore(Arc::new(MemoryStorage::new())).unwrap();
        let config = ApiConfig {
            base_url: format!("{}/api", server.uri()),
            ..ApiConfig::default()
        };
        QuestionApi::new(Arc::new(Transport::new(
            &config,
            session,
            Arc::new(History::new()),
        )))
    }

    #[tokio::test]
    async fn question_bank_filters_by_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes/recommend"))
            .and(query_param("type", "question"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0})))
            .expect(1)
            .mount(&server)
            .await;

        question_api(&server).question_bank(2, 10).await.unwrap();
    }

    #[tokio::test]
    async fn page_question_list_posts_camel_case_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/question/pageQuestionList"))
            .and(body_json(json!({"current": 1, "size": 10, "tagId": "4"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .expect(1)
            .mount(&server)
            .await;

        let query = QuestionQuery {
            tag_id: Some(Id::new("4")),
            ..QuestionQuery::default()
        };
        let payload = question_api(&server)
            .page_question_list(&query)
            .await
            .unwrap();
        assert_eq!(payload, Payload::Json(json!({"records": []})));
    }

    #[tokio::test]
    async fn next_and_prev_send_current_and_tag_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/question/getNext"))
            .and(query_param("currentId", "11"))
            .and(query_param("tagId", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/question/getPrev"))
            .and(query_param("currentId", "11"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 10})))
            .expect(1)
            .mount(&server)
            .await;

        let api = question_api(&server);
        let (current, tag) = (Id::new("11"), Id::new("2"));
        assert_eq!(
            api.next(&current, &tag).await.unwrap(),
            Payload::Json(json!({"id": 12}))
        );
        assert_eq!(
            api.prev(&current, &tag).await.unwrap(),
            Payload::Json(json!({"id": 10}))
        );
    }

    #[tokio::test]
    async fn by_tag_uses_page_and_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/question/getByTag/3"))
            .and(query_param("page", "1"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        question_api(&server)
            .by_tag(&Id::new("3"), 1, 5)
            .await
            .unwrap();
    }
}
