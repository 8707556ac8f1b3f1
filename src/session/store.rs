use super::handle::{SessionHandle, SessionState};
use crate::api::{RegisterRequest, UserApi, UserInfo};
use crate::error::{ApiError, ClientError, ErrorKind};
use crate::notify::Notifier;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

const CODE_SENT: &str = "Verification code sent";
const CODE_FAILED: &str = "Failed to send verification code";
const CODE_NETWORK: &str = "Failed to send verification code, check your network connection";
const LOGIN_OK: &str = "Logged in";
const LOGIN_REJECTED: &str = "Login failed, the code may have expired";
const LOGIN_NETWORK: &str = "Login failed, check your network connection";
const REGISTER_OK: &str = "Registered, please log in";
const REGISTER_FAILED: &str = "Registration failed";
const REGISTER_NETWORK: &str = "Registration failed, check your network connection";
const LOGOUT_OK: &str = "Logged out";

/// User session store.
///
/// Actions never return errors: failures are reported through the
/// [`Notifier`] and leave the session where it was. The boolean results
/// only tell the caller whether to move on (e.g. to the code entry view).
pub struct SessionStore {
    api: UserApi,
    session: SessionHandle,
    notifier: Arc<dyn Notifier>,
    loading: AtomicUsize,
}

/// Keeps `is_loading` raised for as long as an action runs.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SessionStore {
    /// Builds the store over an already restored session.
    pub fn new(api: UserApi, session: SessionHandle, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            session,
            notifier,
            loading: AtomicUsize::new(0),
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn phone(&self) -> Option<String> {
        self.session.phone()
    }

    /// Cached profile; gone once the session has been torn down.
    pub fn user_info(&self) -> Option<UserInfo> {
        self.session.user_info()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst) > 0
    }

    pub async fn send_code(&self, phone: &str) -> bool {
        let _loading = LoadingGuard::enter(&self.loading);
        let payload = match self.api.send_verification_code(phone).await {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, "session.send_code.failed");
                self.notifier
                    .error(&failure_message(&error, CODE_FAILED, CODE_NETWORK));
                return false;
            }
        };

        if !payload.is_truthy() {
            debug!(response = ?payload, "session.send_code.rejected");
            self.notifier.error(CODE_FAILED);
            return false;
        }

        if let Err(error) = self.session.record_code_sent(phone) {
            warn!(error = %error, "session.send_code.persist_failed");
            self.notifier.error(CODE_FAILED);
            return false;
        }
        info!(phone = %phone, "session.code_sent");
        self.notifier.success(CODE_SENT);
        true
    }

    /// Succeeds only when the backend hands back a plain token string.
    pub async fn login(&self, phone: &str, code: &str) -> bool {
        let _loading = LoadingGuard::enter(&self.loading);
        let token = match self.api.login(phone, code).await {
            Ok(token) => token,
            Err(error) => {
                warn!(error = %error, "session.login.failed");
                self.notifier
                    .error(&failure_message(&error, LOGIN_REJECTED, LOGIN_NETWORK));
                return false;
            }
        };

        if let Err(error) = self.session.establish(&token, phone) {
            warn!(error = %error, "session.login.persist_failed");
            self.notifier.error(LOGIN_REJECTED);
            return false;
        }
        self.notifier.success(LOGIN_OK);
        true
    }

    /// Registration does not open a session; the user logs in afterwards.
    pub async fn register(&self, request: &RegisterRequest) -> bool {
        let _loading = LoadingGuard::enter(&self.loading);
        match self.api.register(request).await {
            Ok(_) => {
                info!(phone = %request.phone, "session.registered");
                self.notifier.success(REGISTER_OK);
                true
            }
            Err(error) => {
                warn!(error = %error, "session.register.failed");
                self.notifier
                    .error(&failure_message(&error, REGISTER_FAILED, REGISTER_NETWORK));
                false
            }
        }
    }

    /// Refreshes the cached profile. Failures are logged, not shown.
    pub async fn fetch_user_info(&self) -> Option<UserInfo> {
        if !self.is_logged_in() {
            return None;
        }
        let _loading = LoadingGuard::enter(&self.loading);
        let info = match self.api.get_user_info().await {
            Ok(info) => info,
            Err(error) => {
                warn!(error = %error, "session.user_info.failed");
                return None;
            }
        };
        if let Err(error) = self.session.store_user_info(info.clone()) {
            warn!(error = %error, "session.user_info.persist_failed");
        }
        Some(info)
    }

    /// Shallow-merges `patch` over the cached profile and persists the result.
    pub fn update_user_info(&self, patch: UserInfo) -> Result<UserInfo, ClientError> {
        let mut merged = self.user_info().unwrap_or_default();
        merged.extend(patch);
        self.session.store_user_info(merged.clone())?;
        Ok(merged)
    }

    pub fn logout(&self) {
        self.session.clear();
        self.notifier.success(LOGOUT_OK);
    }
}

/// Picks the user-facing text for a failed action.
fn failure_message(error: &ClientError, fallback: &str, network: &str) -> String {
    match error.kind() {
        ErrorKind::Network | ErrorKind::Unauthorized => network.to_string(),
        ErrorKind::Domain if !matches!(error, ClientError::Api(ApiError::LoginRejected)) => error
            .domain_message()
            .unwrap_or(fallback)
            .to_string(),
        ErrorKind::Domain | ErrorKind::ShapeMismatch | ErrorKind::Local => fallback.to_string(),
    }
}
