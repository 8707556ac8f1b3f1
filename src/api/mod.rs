//! Domain API modules: thin typed wrappers, one remote call each.
//!
//! Wrappers never retry. Transport failures propagate unchanged; the only
//! logic here is normalizing the backend's inconsistent shapes (pagination
//! parameter names, login and upload responses) so stores see one form.

pub mod media;
mod note;
mod question;
pub mod types;
mod user;

pub use media::{ImageUpload, upload_url};
pub use note::NoteApi;
pub use question::QuestionApi;
pub use types::{
    Comment, CommentPage, Id, Note, NoteDraft, NotePage, Page, QuestionDraft, QuestionQuery,
    RegisterRequest, UserInfo,
};
pub use user::UserApi;

use crate::error::{ClientError, TransportError};

/// Validates a value interpolated into a URL path.
pub(crate) fn path_segment(value: &str) -> Result<&str, ClientError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains(['/', '?', '#', '%']) {
        return Err(TransportError::InvalidRequest(format!(
            "invalid path segment: {value:?}"
        ))
        .into());
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segment_rejects_separators() {
        assert_eq!(path_segment(" 42 ").unwrap(), "42");
        assert!(path_segment("").is_err());
        assert!(path_segment("1/../2").is_err());
        assert!(path_segment("1?x=2").is_err());
    }
}
