//! Session state: the shared [`SessionHandle`] and the [`SessionStore`]
//! actions that drive it.

mod handle;
mod store;

pub use handle::{SessionHandle, SessionState};
pub use store::SessionStore;
