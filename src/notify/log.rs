use super::{Notice, NoticeLevel, Notifier};
use tracing::{info, warn};

/// Tracing-backed notifier used by the command-line front end.
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "notice.success"),
            NoticeLevel::Error => warn!(message = %notice.message, "notice.error"),
        }
    }
}
