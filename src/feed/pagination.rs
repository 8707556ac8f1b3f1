use serde::Serialize;

/// Pagination position of one feed tab.
///
/// `current_page` never exceeds `total_pages`; a backend that reports fewer
/// pages than the one just served is clamped up to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl PageCursor {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: 1,
        }
    }

    pub fn has_more(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn next_page(&self) -> Option<u32> {
        self.has_more().then(|| self.current_page + 1)
    }

    /// Records a successfully applied page.
    pub fn advance(&mut self, page: u32, total_pages: u32) {
        self.current_page = page;
        self.total_pages = total_pages.max(page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cursor_has_nothing_more() {
        let cursor = PageCursor::new(10);
        assert!(!cursor.has_more());
        assert_eq!(cursor.next_page(), None);
    }

    #[test]
    fn advance_tracks_server_total() {
        let mut cursor = PageCursor::new(10);
        cursor.advance(1, 3);
        assert_eq!(cursor.next_page(), Some(2));
        cursor.advance(3, 3);
        assert!(!cursor.has_more());
    }

    #[test]
    fn total_never_drops_below_current_page() {
        let mut cursor = PageCursor::new(10);
        cursor.advance(4, 0);
        assert_eq!(cursor.total_pages, 4);
        assert!(!cursor.has_more());
    }
}
