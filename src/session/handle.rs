use crate::api::UserInfo;
use crate::error::StorageError;
use crate::storage::{LocalStorage, PHONE_KEY, TOKEN_KEY, USER_INFO_KEY};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    CodeSent { phone: String },
    LoggedIn { token: String, phone: String },
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::LoggedIn { token, .. } => Some(token.as_str()),
            Self::LoggedOut | Self::CodeSent { .. } => None,
        }
    }

    pub fn phone(&self) -> Option<&str> {
        match self {
            Self::CodeSent { phone } | Self::LoggedIn { phone, .. } if !phone.is_empty() => {
                Some(phone.as_str())
            }
            _ => None,
        }
    }
}

/// The explicit session object shared by the transport and the stores.
///
/// Every transition writes through to durable storage before the in-memory
/// state changes, so a failed write leaves the previous state in place.
/// The cached profile lives here too, so that tearing the session down
/// from any path (logout or a 401) also drops it.
#[derive(Clone)]
pub struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
    user_info: Arc<RwLock<Option<UserInfo>>>,
    storage: Arc<dyn LocalStorage>,
}

impl SessionHandle {
    /// Rebuilds the session from whatever durable storage holds.
    pub fn restore(storage: Arc<dyn LocalStorage>) -> Result<Self, StorageError> {
        let token = storage.get(TOKEN_KEY)?.filter(|token| !token.is_empty());
        let phone = storage.get(PHONE_KEY)?.unwrap_or_default();
        let state = match token {
            Some(token) => SessionState::LoggedIn { token, phone },
            None if !phone.is_empty() => SessionState::CodeSent { phone },
            None => SessionState::LoggedOut,
        };
        let user_info = read_user_info(storage.as_ref());
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            user_info: Arc::new(RwLock::new(user_info)),
            storage,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state().token().map(ToOwned::to_owned)
    }

    pub fn phone(&self) -> Option<String> {
        self.state().phone().map(ToOwned::to_owned)
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().token().is_some()
    }

    /// Cached profile of the signed-in user; `None` without a session.
    pub fn user_info(&self) -> Option<UserInfo> {
        if !self.is_authenticated() {
            return None;
        }
        self.user_info
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn storage(&self) -> &Arc<dyn LocalStorage> {
        &self.storage
    }

    fn replace(&self, next: SessionState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn forget_user_info(&self) {
        self.user_info
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub(crate) fn store_user_info(&self, info: UserInfo) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&info)?;
        self.storage.set(USER_INFO_KEY, &serialized)?;
        *self.user_info.write().unwrap_or_else(PoisonError::into_inner) = Some(info);
        Ok(())
    }

    /// Remembers the phone a code was sent to. An open session keeps its token.
    pub(crate) fn record_code_sent(&self, phone: &str) -> Result<(), StorageError> {
        self.storage.set(PHONE_KEY, phone)?;
        let next = match self.state() {
            SessionState::LoggedIn { token, .. } => SessionState::LoggedIn {
                token,
                phone: phone.to_string(),
            },
            SessionState::LoggedOut | SessionState::CodeSent { .. } => SessionState::CodeSent {
                phone: phone.to_string(),
            },
        };
        self.replace(next);
        Ok(())
    }

    /// Opens a session. A profile cached for a different token is dropped.
    pub(crate) fn establish(&self, token: &str, phone: &str) -> Result<(), StorageError> {
        let previous_token = self.storage.get(TOKEN_KEY)?;
        self.storage.set(TOKEN_KEY, token)?;
        if let Err(error) = self.storage.set(PHONE_KEY, phone) {
            self.put_back(TOKEN_KEY, previous_token.as_deref());
            return Err(error);
        }

        if self.token().as_deref() != Some(token) {
            if let Err(error) = self.storage.remove(USER_INFO_KEY) {
                warn!(error = %error, "session.user_info.remove_failed");
            }
            self.forget_user_info();
        }
        self.replace(SessionState::LoggedIn {
            token: token.to_string(),
            phone: phone.to_string(),
        });
        info!(phone = %phone, "session.established");
        Ok(())
    }

    /// Drops token, phone and cached user info, in memory and on disk.
    /// Returns whether a token was held.
    pub fn clear(&self) -> bool {
        let had_token = self.is_authenticated();
        self.replace(SessionState::LoggedOut);
        self.forget_user_info();
        for key in [TOKEN_KEY, PHONE_KEY, USER_INFO_KEY] {
            if let Err(error) = self.storage.remove(key) {
                warn!(key = key, error = %error, "session.clear.storage_failed");
            }
        }
        info!(had_token = had_token, "session.cleared");
        had_token
    }

    fn put_back(&self, key: &str, value: Option<&str>) {
        let restored = match value {
            Some(value) => self.storage.set(key, value),
            None => self.storage.remove(key),
        };
        if let Err(error) = restored {
            warn!(key = key, error = %error, "session.rollback_failed");
        }
    }
}

fn read_user_info(storage: &dyn LocalStorage) -> Option<UserInfo> {
    let raw = match storage.get(USER_INFO_KEY) {
        Ok(raw) => raw?,
        Err(error) => {
            warn!(error = %error, "session.user_info.read_failed");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(info) => Some(info),
        Err(error) => {
            warn!(error = %error, "session.user_info.corrupt");
            None
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state() {
            SessionState::LoggedOut => "logged_out",
            SessionState::CodeSent { .. } => "code_sent",
            SessionState::LoggedIn { .. } => "logged_in",
        };
        f.debug_struct("SessionHandle").field("state", &state).finish()
    }
}
