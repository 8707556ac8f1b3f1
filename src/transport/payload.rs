use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body after the transport envelope has been stripped.
///
/// The backend answers some endpoints with a bare string (JSON string
/// literal or plain text) and others with JSON documents; both are made
/// explicit here instead of being sniffed at every call site.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Text(String),
    Json(Value),
}

impl Payload {
    pub fn parse(body: &str) -> Self {
        if body.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Null) => Self::Empty,
            Ok(Value::String(text)) => Self::Text(text),
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(body.to_string()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Empty | Self::Json(_) => None,
        }
    }

    /// Loose "did the server say anything" test used by fire-and-forget
    /// endpoints such as sending a verification code.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Text(text) => !text.is_empty(),
            Self::Json(Value::Bool(flag)) => *flag,
            Self::Json(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
            Self::Json(_) => true,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(text) => Value::String(text),
            Self::Json(value) => value,
        }
    }

    pub fn decode<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        serde_json::from_value(self.into_value()).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    pub fn into_envelope<T: DeserializeOwned>(
        self,
        endpoint: &str,
    ) -> Result<Envelope<T>, ApiError> {
        self.decode(endpoint)
    }

    /// Decodes `{code, message, data}` and returns `data` when `code == 0`.
    pub fn into_data<T: DeserializeOwned>(self, endpoint: &str) -> Result<T, ApiError> {
        self.into_envelope::<T>(endpoint)?.into_data(endpoint)
    }
}

/// Domain status wrapper used by most list and mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub const SUCCESS: i64 = 0;

    pub fn is_success(&self) -> bool {
        self.code == Self::SUCCESS
    }

    /// Success check without requiring a `data` member.
    pub fn ensure_success(self, endpoint: &str) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Domain {
                endpoint: endpoint.to_string(),
                code: self.code,
                message: self.message,
            })
        }
    }

    pub fn into_data(self, endpoint: &str) -> Result<T, ApiError> {
        self.ensure_success(endpoint)?
            .ok_or_else(|| ApiError::ShapeMismatch {
                endpoint: endpoint.to_string(),
                detail: "envelope has no data".into(),
            })
    }
}
