use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for the `RedNote` client.
///
/// Each subsystem defines its own error variant. Store actions match on
/// [`ClientError::kind`] to decide what to tell the user; the binary and the
/// config loader keep using `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Transport ───────────────────────────────────────────────────────
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    // ── Domain API ──────────────────────────────────────────────────────
    #[error("api: {0}")]
    Api(#[from] ApiError),

    // ── Durable storage ─────────────────────────────────────────────────
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used by the stores when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Connection, timeout or non-401 HTTP status.
    Network,
    /// The backend answered 401; the session has already been torn down.
    Unauthorized,
    /// Transport succeeded but the payload's status code signals failure.
    Domain,
    /// The payload matched none of the expected shapes.
    ShapeMismatch,
    /// Storage or configuration problems that never reached the network.
    Local,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(TransportError::Unauthorized) => ErrorKind::Unauthorized,
            Self::Transport(_) => ErrorKind::Network,
            Self::Api(ApiError::Domain { .. } | ApiError::LoginRejected) => ErrorKind::Domain,
            Self::Api(ApiError::ShapeMismatch { .. } | ApiError::Decode { .. }) => {
                ErrorKind::ShapeMismatch
            }
            Self::Config(_) | Self::Storage(_) | Self::Other(_) => ErrorKind::Local,
        }
    }

    /// Backend-provided message for domain failures, if any.
    pub fn domain_message(&self) -> Option<&str> {
        match self {
            Self::Api(ApiError::Domain {
                message: Some(message),
                ..
            }) if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Transport errors ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unauthorized; session cleared")]
    Unauthorized,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

// ─── Domain API errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{endpoint} failed with code {code}: {}", message.as_deref().unwrap_or("no message"))]
    Domain {
        endpoint: String,
        code: i64,
        message: Option<String>,
    },

    #[error("{endpoint} returned an unexpected shape: {detail}")]
    ShapeMismatch { endpoint: String, detail: String },

    #[error("{endpoint} payload could not be decoded: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("login did not return a token")]
    LoginRejected,
}

// ─── Storage errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
