//! Note feed store: two independently paginated tabs, the note detail slot
//! and its comments.
//!
//! State lives behind a `std::sync::Mutex` that is only held between awaits,
//! never across one. Every view carries a [`Generation`]; responses that
//! arrive after their view has moved on are dropped instead of written.

mod generation;
mod pagination;

pub use generation::Generation;
pub use pagination::PageCursor;

use crate::api::{Comment, Id, Note, NoteApi, NoteDraft};
use crate::config::FeedConfig;
use crate::error::{ApiError, ClientError, ErrorKind};
use crate::notify::Notifier;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

const NETWORK_ERROR: &str = "Network error, please try again later";
const NOTES_FAILED: &str = "Failed to load notes";
const DETAIL_FAILED: &str = "Failed to load the note";
const COMMENTS_FAILED: &str = "Failed to load comments";
const PUBLISH_OK: &str = "Published";
const PUBLISH_FAILED: &str = "Failed to publish";
const LIKE_FAILED: &str = "Failed to like the note, please try again later";
const UNLIKE_FAILED: &str = "Failed to remove the like, please try again later";
const COMMENT_OK: &str = "Comment posted";
const COMMENT_FAILED: &str = "Failed to post the comment";
const COMMENT_NETWORK: &str = "Failed to post the comment, please try again later";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeedTab {
    #[default]
    Recommend,
    Following,
}

/// What happened to a response once it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// The view moved on while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    /// Already on the last page, or another list fetch is running.
    Skipped,
    Fetched(FetchOutcome),
}

/// Read-only view of the active tab.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub tab: FeedTab,
    pub cursor: PageCursor,
    pub notes: Vec<Note>,
}

#[derive(Debug)]
struct FeedState {
    tab: FeedTab,
    recommended: Vec<Note>,
    following: Vec<Note>,
    recommended_cursor: PageCursor,
    following_cursor: PageCursor,
    current_note: Option<Note>,
    comments: Vec<Comment>,
    comments_note: Option<Id>,
    list_generation: Generation,
    detail_generation: Generation,
    comments_generation: Generation,
    list_in_flight: usize,
    pending: usize,
}

impl FeedState {
    fn new(page_size: u32) -> Self {
        Self {
            tab: FeedTab::default(),
            recommended: Vec::new(),
            following: Vec::new(),
            recommended_cursor: PageCursor::new(page_size),
            following_cursor: PageCursor::new(page_size),
            current_note: None,
            comments: Vec::new(),
            comments_note: None,
            list_generation: Generation::default(),
            detail_generation: Generation::default(),
            comments_generation: Generation::default(),
            list_in_flight: 0,
            pending: 0,
        }
    }

    fn notes(&self, tab: FeedTab) -> &Vec<Note> {
        match tab {
            FeedTab::Recommend => &self.recommended,
            FeedTab::Following => &self.following,
        }
    }

    fn notes_mut(&mut self, tab: FeedTab) -> &mut Vec<Note> {
        match tab {
            FeedTab::Recommend => &mut self.recommended,
            FeedTab::Following => &mut self.following,
        }
    }

    fn cursor(&self, tab: FeedTab) -> PageCursor {
        match tab {
            FeedTab::Recommend => self.recommended_cursor,
            FeedTab::Following => self.following_cursor,
        }
    }

    fn cursor_mut(&mut self, tab: FeedTab) -> &mut PageCursor {
        match tab {
            FeedTab::Recommend => &mut self.recommended_cursor,
            FeedTab::Following => &mut self.following_cursor,
        }
    }

    /// Marks a list fetch for `page` of the active tab as started.
    fn begin_list(&mut self, page: u32) -> ListRequest {
        let generation = if page <= 1 {
            self.list_generation.bump()
        } else {
            self.list_generation.current()
        };
        self.list_in_flight += 1;
        self.pending += 1;
        ListRequest {
            tab: self.tab,
            page: page.max(1),
            limit: self.cursor(self.tab).page_size,
            generation,
        }
    }

    /// First cached copy in lookup order: recommended, following, detail.
    fn find(&self, note_id: &Id) -> Option<&Note> {
        self.recommended
            .iter()
            .find(|note| &note.id == note_id)
            .or_else(|| self.following.iter().find(|note| &note.id == note_id))
            .or_else(|| {
                self.current_note
                    .as_ref()
                    .filter(|note| &note.id == note_id)
            })
    }

    /// Applies `patch` to every cached copy of the note; returns how many.
    fn patch(&mut self, note_id: &Id, patch: impl Fn(&mut Note)) -> usize {
        let mut patched = 0;
        for note in self
            .recommended
            .iter_mut()
            .chain(self.following.iter_mut())
            .chain(self.current_note.iter_mut())
            .filter(|note| &note.id == note_id)
        {
            patch(note);
            patched += 1;
        }
        patched
    }
}

#[derive(Debug, Clone, Copy)]
struct ListRequest {
    tab: FeedTab,
    page: u32,
    limit: u32,
    generation: u64,
}

/// Releases the in-flight markers taken when a request started, even if
/// the request future is dropped half way.
struct Pending<'a> {
    store: &'a FeedStore,
    list: bool,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        let mut state = self.store.state();
        state.pending = state.pending.saturating_sub(1);
        if self.list {
            state.list_in_flight = state.list_in_flight.saturating_sub(1);
        }
    }
}

pub struct FeedStore {
    api: NoteApi,
    notifier: Arc<dyn Notifier>,
    comment_page_size: u32,
    state: Mutex<FeedState>,
}

impl FeedStore {
    pub fn new(api: NoteApi, notifier: Arc<dyn Notifier>, config: &FeedConfig) -> Self {
        Self {
            api,
            notifier,
            comment_page_size: config.comment_page_size,
            state: Mutex::new(FeedState::new(config.page_size)),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Getters ─────────────────────────────────────────────────────────

    pub fn tab(&self) -> FeedTab {
        self.state().tab
    }

    /// Cursor of the active tab.
    pub fn cursor(&self) -> PageCursor {
        let state = self.state();
        state.cursor(state.tab)
    }

    pub fn display_notes(&self) -> Vec<Note> {
        let state = self.state();
        state.notes(state.tab).clone()
    }

    pub fn recommended_notes(&self) -> Vec<Note> {
        self.state().recommended.clone()
    }

    pub fn following_notes(&self) -> Vec<Note> {
        self.state().following.clone()
    }

    pub fn has_more_notes(&self) -> bool {
        self.cursor().has_more()
    }

    pub fn current_note(&self) -> Option<Note> {
        self.state().current_note.clone()
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state().comments.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().pending > 0
    }

    pub fn find_note(&self, note_id: &Id) -> Option<Note> {
        self.state().find(note_id).cloned()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.state();
        FeedSnapshot {
            tab: state.tab,
            cursor: state.cursor(state.tab),
            notes: state.notes(state.tab).clone(),
        }
    }

    // ── Lists ───────────────────────────────────────────────────────────

    /// Switches the active tab and reloads its first page.
    pub async fn set_tab(&self, tab: FeedTab) -> Result<FetchOutcome, ClientError> {
        self.select_tab(tab);
        self.fetch_notes(1).await
    }

    /// Switches the active tab without fetching. Responses still in flight
    /// for the previous tab are discarded.
    pub fn select_tab(&self, tab: FeedTab) {
        let mut state = self.state();
        state.tab = tab;
        state.list_generation.bump();
        debug!(tab = %tab, "feed.tab");
    }

    /// Page 1 replaces the active tab's notes; later pages append.
    ///
    /// Failures are reported through the notifier and leave notes and
    /// cursor untouched; the error is returned as well.
    pub async fn fetch_notes(&self, page: u32) -> Result<FetchOutcome, ClientError> {
        let request = self.state().begin_list(page);
        self.run_list(request).await
    }

    /// Fetches the next page unless the tab is exhausted or a list fetch
    /// is already running. Concurrent calls are dropped, not queued.
    pub async fn load_more_notes(&self) -> Result<LoadMore, ClientError> {
        let request = {
            let mut state = self.state();
            let Some(next) = state.cursor(state.tab).next_page() else {
                return Ok(LoadMore::Skipped);
            };
            if state.list_in_flight > 0 {
                debug!(tab = %state.tab, "feed.load_more.busy");
                return Ok(LoadMore::Skipped);
            }
            state.begin_list(next)
        };
        self.run_list(request).await.map(LoadMore::Fetched)
    }

    async fn run_list(&self, request: ListRequest) -> Result<FetchOutcome, ClientError> {
        let _pending = Pending {
            store: self,
            list: true,
        };
        let ListRequest {
            tab,
            page,
            limit,
            generation,
        } = request;

        let result = match tab {
            FeedTab::Recommend => self.api.recommended(page, limit).await,
            FeedTab::Following => self.api.following(page, limit).await,
        };

        let mut state = self.state();
        if !state.list_generation.is_current(generation) {
            debug!(tab = %tab, page = page, "feed.notes.discarded");
            return Ok(FetchOutcome::Discarded);
        }
        match result {
            Ok(fetched) => {
                let received = fetched.list.len();
                let notes = state.notes_mut(tab);
                if page == 1 {
                    *notes = fetched.list;
                } else {
                    notes.extend(fetched.list);
                }
                state.cursor_mut(tab).advance(page, fetched.total_pages);
                debug!(
                    tab = %tab,
                    page = page,
                    received = received,
                    total_pages = fetched.total_pages,
                    "feed.notes.applied"
                );
                Ok(FetchOutcome::Applied)
            }
            Err(error) => {
                drop(state);
                warn!(tab = %tab, page = page, error = %error, "feed.notes.failed");
                self.report(&error, NOTES_FAILED);
                Err(error)
            }
        }
    }

    // ── Detail and comments ─────────────────────────────────────────────

    pub async fn fetch_note_detail(&self, note_id: &Id) -> Result<FetchOutcome, ClientError> {
        let generation = {
            let mut state = self.state();
            state.pending += 1;
            state.detail_generation.bump()
        };
        let _pending = Pending {
            store: self,
            list: false,
        };

        let result = self.api.detail(note_id).await;

        let mut state = self.state();
        if !state.detail_generation.is_current(generation) {
            debug!(note = %note_id, "feed.detail.discarded");
            return Ok(FetchOutcome::Discarded);
        }
        match result {
            Ok(Some(note)) => {
                state.current_note = Some(note.into_detail());
                Ok(FetchOutcome::Applied)
            }
            Ok(None) => {
                drop(state);
                self.notifier.error(DETAIL_FAILED);
                Err(ApiError::ShapeMismatch {
                    endpoint: format!("/content/getContentDetail/{note_id}"),
                    detail: "empty response".into(),
                }
                .into())
            }
            Err(error) => {
                state.current_note = None;
                drop(state);
                warn!(note = %note_id, error = %error, "feed.detail.failed");
                self.report(&error, DETAIL_FAILED);
                Err(error)
            }
        }
    }

    pub async fn fetch_note_comments(
        &self,
        note_id: &Id,
        page: u32,
    ) -> Result<FetchOutcome, ClientError> {
        let page = page.max(1);
        let generation = {
            let mut state = self.state();
            state.pending += 1;
            if page == 1 {
                state.comments_generation.bump()
            } else {
                state.comments_generation.current()
            }
        };
        let _pending = Pending {
            store: self,
            list: false,
        };

        let result = self
            .api
            .comments(note_id, page, self.comment_page_size)
            .await;

        let mut state = self.state();
        if !state.comments_generation.is_current(generation) {
            debug!(note = %note_id, page = page, "feed.comments.discarded");
            return Ok(FetchOutcome::Discarded);
        }
        match result {
            Ok(fetched) => {
                if page == 1 {
                    state.comments = fetched.list;
                    state.comments_note = Some(note_id.clone());
                } else {
                    state.comments.extend(fetched.list);
                }
                Ok(FetchOutcome::Applied)
            }
            Err(error) => {
                drop(state);
                warn!(note = %note_id, error = %error, "feed.comments.failed");
                self.report(&error, COMMENTS_FAILED);
                Err(error)
            }
        }
    }

    // ── Mutations ───────────────────────────────────────────────────────

    pub async fn publish_note(&self, draft: &NoteDraft) -> Result<Value, ClientError> {
        self.state().pending += 1;
        let _pending = Pending {
            store: self,
            list: false,
        };
        match self.api.publish(draft).await {
            Ok(created) => {
                info!(title = %draft.title, "feed.published");
                self.notifier.success(PUBLISH_OK);
                Ok(created)
            }
            Err(error) => {
                warn!(error = %error, "feed.publish.failed");
                self.report(&error, PUBLISH_FAILED);
                Err(error)
            }
        }
    }

    /// Likes on the server, then patches every cached copy. Returns the new
    /// local count when the note was cached anywhere.
    pub async fn like_note(&self, note_id: &Id) -> Result<Option<u64>, ClientError> {
        if let Err(error) = self.api.like(note_id).await {
            warn!(note = %note_id, error = %error, "feed.like.failed");
            self.notifier.error(LIKE_FAILED);
            return Err(error);
        }
        Ok(self.apply_like(note_id, true))
    }

    pub async fn unlike_note(&self, note_id: &Id) -> Result<Option<u64>, ClientError> {
        if let Err(error) = self.api.unlike(note_id).await {
            warn!(note = %note_id, error = %error, "feed.unlike.failed");
            self.notifier.error(UNLIKE_FAILED);
            return Err(error);
        }
        Ok(self.apply_like(note_id, false))
    }

    fn apply_like(&self, note_id: &Id, liked: bool) -> Option<u64> {
        let mut state = self.state();
        let count = state.find(note_id)?.like_count;
        let next = if liked {
            count.saturating_add(1)
        } else {
            count.saturating_sub(1)
        };
        let patched = state.patch(note_id, |note| {
            note.is_liked = liked;
            note.like_count = next;
            if note.likes.is_some() {
                note.likes = Some(next);
            }
        });
        debug!(note = %note_id, liked = liked, like_count = next, copies = patched, "feed.patch.like");
        Some(next)
    }

    /// Posts a comment; on success it is prepended to the loaded comments
    /// of that note and the cached comment counts go up by one.
    pub async fn comment_note(&self, note_id: &Id, content: &str) -> Result<Comment, ClientError> {
        let comment = match self.api.comment(note_id, content).await {
            Ok(comment) => comment,
            Err(error) => {
                warn!(note = %note_id, error = %error, "feed.comment.failed");
                let message = match error.kind() {
                    ErrorKind::Domain => error.domain_message().unwrap_or(COMMENT_FAILED),
                    ErrorKind::ShapeMismatch => COMMENT_FAILED,
                    ErrorKind::Network | ErrorKind::Unauthorized | ErrorKind::Local => {
                        COMMENT_NETWORK
                    }
                };
                self.notifier.error(message);
                return Err(error);
            }
        };

        {
            let mut state = self.state();
            if state.comments_note.as_ref() == Some(note_id) {
                state.comments.insert(0, comment.clone());
            }
            if let Some(count) = state.find(note_id).map(|note| note.comment_count) {
                let next = count.saturating_add(1);
                let patched = state.patch(note_id, |note| note.comment_count = next);
                debug!(note = %note_id, comment_count = next, copies = patched, "feed.patch.comment");
            }
        }
        self.notifier.success(COMMENT_OK);
        Ok(comment)
    }

    fn report(&self, error: &ClientError, fallback: &str) {
        let message = match error.kind() {
            ErrorKind::Network | ErrorKind::Unauthorized => NETWORK_ERROR,
            ErrorKind::Domain => error.domain_message().unwrap_or(fallback),
            ErrorKind::ShapeMismatch | ErrorKind::Local => fallback,
        };
        self.notifier.error(message);
    }
}
