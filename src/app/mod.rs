//! Explicit wiring of every collaborator from a [`Config`].
//!
//! Nothing here is global: the session handle is built once from durable
//! storage and handed to the transport and both stores.

pub mod status;

use crate::api::{NoteApi, QuestionApi, UserApi};
use crate::config::Config;
use crate::error::ClientError;
use crate::feed::FeedStore;
use crate::notify::{LogNotifier, Notifier};
use crate::router::{History, Navigator, Resolution, Router};
use crate::session::{SessionHandle, SessionStore};
use crate::storage::{FileStorage, LocalStorage};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::debug;

pub struct AppContext {
    pub config: Config,
    pub session: SessionHandle,
    pub history: Arc<History>,
    pub transport: Arc<Transport>,
    pub users: UserApi,
    pub notes: NoteApi,
    pub questions: QuestionApi,
    pub session_store: SessionStore,
    pub feed: FeedStore,
    pub router: Router,
}

impl AppContext {
    /// File-backed storage at `config.storage_path()`, notifications as
    /// tracing events.
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let storage = FileStorage::open(config.storage_path())?;
        debug!(path = %storage.path().display(), "storage.opened");
        Self::with_parts(config, Arc::new(storage), Arc::new(LogNotifier::new()))
    }

    pub fn with_parts(
        config: Config,
        storage: Arc<dyn LocalStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        config.validate()?;
        let session = SessionHandle::restore(storage)?;
        let history = Arc::new(History::new());
        let navigator: Arc<dyn Navigator> = history.clone();
        let transport = Arc::new(Transport::new(&config.api, session.clone(), navigator));

        let users = UserApi::new(Arc::clone(&transport));
        let notes = NoteApi::new(Arc::clone(&transport));
        let questions = QuestionApi::new(Arc::clone(&transport));
        let session_store = SessionStore::new(users.clone(), session.clone(), Arc::clone(&notifier));
        let feed = FeedStore::new(notes.clone(), notifier, &config.feed);

        Ok(Self {
            config,
            session,
            history,
            transport,
            users,
            notes,
            questions,
            session_store,
            feed,
            router: Router::default(),
        })
    }

    /// Resolves `full_path` against the current session and records where
    /// the client ends up.
    pub fn navigate(&self, full_path: &str) -> Resolution {
        let resolution = self
            .router
            .resolve(full_path, self.session.is_authenticated());
        let location = match &resolution {
            Resolution::Render(route) => route.full_path.as_str(),
            Resolution::Redirect { location } => location.as_str(),
        };
        self.history.redirect(location);
        resolution
    }
}
