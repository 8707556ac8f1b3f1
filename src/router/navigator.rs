use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Something that can move the client to another location.
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// In-memory navigation history. The last entry is the current location.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(location: &str) -> Self {
        Self {
            entries: Mutex::new(vec![location.to_string()]),
        }
    }

    pub fn current(&self) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn redirect(&self, location: &str) {
        info!(location = %location, "navigate.redirect");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_appends_and_moves_current() {
        let history = History::starting_at("/home/recommend");
        history.redirect("/login");

        assert_eq!(history.current().as_deref(), Some("/login"));
        assert_eq!(history.entries(), vec!["/home/recommend", "/login"]);
    }
}
