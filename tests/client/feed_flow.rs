use crate::backend::{harness, notes_page};
use rednote::api::Id;
use rednote::feed::{FeedTab, FetchOutcome, LoadMore};
use rednote::storage::{LocalStorage, TOKEN_KEY};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn recommended_feed_paginates_to_the_end() {
    let server = MockServer::start().await;
    for page in 1..=3_u32 {
        Mock::given(method("GET"))
            .and(path("/api/notes/recommend"))
            .and(query_param("page", page.to_string()))
            .and(query_param("limit", "10"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(notes_page(u64::from(page - 1) * 10 + 1, 10, 3)),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let h = harness(&server);
    let feed = &h.app.feed;
    feed.fetch_notes(1).await.expect("page 1");
    assert_eq!(feed.display_notes().len(), 10);
    assert_eq!(feed.cursor().current_page, 1);

    assert_eq!(
        feed.load_more_notes().await.expect("page 2"),
        LoadMore::Fetched(FetchOutcome::Applied)
    );
    assert_eq!(feed.display_notes().len(), 20);
    assert_eq!(feed.cursor().current_page, 2);

    feed.load_more_notes().await.expect("page 3");
    assert_eq!(feed.display_notes().len(), 30);
    assert!(!feed.has_more_notes());
    assert_eq!(
        feed.load_more_notes().await.expect("no-op"),
        LoadMore::Skipped
    );
}

#[tokio::test]
async fn following_feed_sends_token_and_current_size() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/content/getSelfFollowerFeed"))
        .and(header("authorization", "stored-token"))
        .and(query_param("current", "1"))
        .and(query_param("size", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notes_page(50, 4, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    {
        let config = crate::backend::config_for(&server, &dir);
        let storage = rednote::storage::FileStorage::open(config.storage_path()).expect("storage");
        storage.set(TOKEN_KEY, "stored-token").expect("seed token");
    }
    let h = crate::backend::reopen(&server, dir);

    assert_eq!(
        h.app.feed.set_tab(FeedTab::Following).await.expect("following"),
        FetchOutcome::Applied
    );
    let snapshot = h.app.feed.snapshot();
    assert_eq!(snapshot.tab, FeedTab::Following);
    assert_eq!(snapshot.notes.len(), 4);
    assert!(h.app.feed.recommended_notes().is_empty());
}

#[tokio::test]
async fn like_round_trip_through_detail_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(notes_page(1, 5, 1)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/content/getContentDetail/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"id": 3, "title": "note 3", "like": false, "likeCount": 3, "images": ["a.png"]}),
        ))
        .mount(&server)
        .await;
    for action in ["like", "unlike"] {
        Mock::given(method("POST"))
            .and(path(format!("/api/content/{action}/3")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!(true)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let h = harness(&server);
    let feed = &h.app.feed;
    let id = Id::new("3");
    feed.fetch_notes(1).await.expect("feed");
    feed.fetch_note_detail(&id).await.expect("detail");
    let detail = feed.current_note().expect("detail note");
    assert_eq!(detail.likes, Some(3));
    assert_eq!(detail.extra.get("images"), Some(&json!(["a.png"])));

    assert_eq!(feed.like_note(&id).await.expect("like"), Some(4));
    assert_eq!(feed.unlike_note(&id).await.expect("unlike"), Some(3));

    let listed = feed.find_note(&id).expect("listed copy");
    assert_eq!(listed.like_count, 3);
    assert!(!listed.is_liked);
    assert_eq!(feed.current_note().expect("detail").like_count, 3);
}
