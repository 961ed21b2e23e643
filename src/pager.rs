//! Backward paging over the saved vocabulary, newest page first.

use crate::models::PageInfo;

/// Number of words shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 5;

/// Cursor into the saved words, counted from the newest entry backwards.
///
/// Every operation takes the current word count instead of caching it, so the
/// pager stays correct while words are being added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    cursor: u64,
    page_size: u64,
}

impl Default for Pager {
    fn default() -> Self {
        Pager::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    /// A zero page size is bumped to 1.
    pub fn new(page_size: u64) -> Self {
        Pager {
            cursor: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// `(limit, offset)` in insertion order for the page under the cursor.
    ///
    /// The oldest page may be short; `None` when it would be empty.
    pub fn window(&self, total: u64) -> Option<(u64, u64)> {
        let mut idx = total as i128 - self.cursor as i128 - self.page_size as i128;
        let mut len = self.page_size as i128;
        if idx < 0 {
            len += idx;
            idx = 0;
        }
        (len > 0).then_some((len as u64, idx as u64))
    }

    /// Moves one page towards older words, unless that page would be empty.
    pub fn next(&mut self, total: u64) {
        if self.cursor + self.page_size < total {
            self.cursor += self.page_size;
        }
    }

    /// Moves one page towards newer words.
    pub fn prev(&mut self) {
        self.cursor = self.cursor.saturating_sub(self.page_size);
    }

    /// Jumps to the newest page.
    pub fn first(&mut self) {
        self.cursor = 0;
    }

    /// Jumps to the oldest page.
    pub fn last(&mut self, total: u64) {
        self.cursor = (total / self.page_size) * self.page_size;
        if self.cursor == total && total > 0 {
            self.cursor -= self.page_size;
        }
    }

    /// Current page number and page count; `reset` reports the first page without moving.
    pub fn page_info(&self, total: u64, reset: bool) -> PageInfo {
        let cursor = if reset { 0 } else { self.cursor };
        let total_pages = total.div_ceil(self.page_size);
        let current = if total_pages > 0 {
            cursor / self.page_size + 1
        } else {
            0
        };
        PageInfo {
            current,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_page_window() {
        let pager = Pager::new(5);
        assert_eq!(pager.window(12), Some((5, 7)));
        assert_eq!(pager.window(3), Some((3, 0)));
        assert_eq!(pager.window(0), None);
    }

    #[test]
    fn oldest_page_is_short() {
        let mut pager = Pager::new(5);
        pager.next(12);
        assert_eq!(pager.window(12), Some((5, 2)));
        pager.next(12);
        assert_eq!(pager.cursor(), 10);
        assert_eq!(pager.window(12), Some((2, 0)));

        // Already on the oldest page.
        pager.next(12);
        assert_eq!(pager.cursor(), 10);
    }

    #[test]
    fn next_then_prev_round_trips() {
        let mut pager = Pager::new(5);
        for _ in 0..3 {
            pager.next(40);
        }
        assert_eq!(pager.cursor(), 15);
        for _ in 0..3 {
            pager.prev();
        }
        assert_eq!(pager.cursor(), 0);

        pager.prev();
        assert_eq!(pager.cursor(), 0);
    }

    #[test]
    fn last_page_cursor() {
        let mut pager = Pager::new(5);
        pager.last(12);
        assert_eq!(pager.cursor(), 10);

        pager.last(10);
        assert_eq!(pager.cursor(), 5);
        assert_eq!(pager.window(10), Some((5, 0)));

        pager.last(0);
        assert_eq!(pager.cursor(), 0);

        pager.last(3);
        pager.first();
        assert_eq!(pager.cursor(), 0);
    }

    #[test]
    fn page_numbers() {
        let mut pager = Pager::new(5);
        assert_eq!(
            pager.page_info(0, false),
            PageInfo {
                current: 0,
                total_pages: 0
            }
        );
        assert_eq!(
            pager.page_info(12, false),
            PageInfo {
                current: 1,
                total_pages: 3
            }
        );

        pager.last(12);
        assert_eq!(pager.page_info(12, false).current, 3);
        assert_eq!(pager.page_info(12, true).current, 1);
        // Reporting with reset does not move the cursor.
        assert_eq!(pager.cursor(), 10);
    }

    #[test]
    fn zero_page_size_is_clamped() {
        let pager = Pager::new(0);
        assert_eq!(pager.page_size(), 1);
    }
}
