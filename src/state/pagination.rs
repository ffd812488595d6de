//! Page controls

use crate::models::Page;

/// Number of pages needed for `count` items
///
/// A page size of zero is treated as one.
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = count.div_ceil(size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Page numbers shown by the page control, starting at 1
///
/// `count = 25, page_size = 10` gives `[1, 2, 3]` whatever the size of
/// the last page.
pub fn page_numbers(count: u64, page_size: u32) -> Vec<u32> {
    (1..=total_pages(count, page_size)).collect()
}

/// Current position in a paginated list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: u32,
    page_size: u32,
    count: u64,
}

impl Paginator {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            count: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.count, self.page_size)
    }

    pub fn pages(&self) -> Vec<u32> {
        page_numbers(self.count, self.page_size)
    }

    /// Record the total reported by the latest response
    pub fn update_from<T>(&mut self, page: &Page<T>) {
        self.count = page.count;
    }

    pub fn set_count(&mut self, count: u64) {
        self.count = count;
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Move to the next page; returns whether the page changed
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            true
        } else {
            false
        }
    }

    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to the known range
    ///
    /// Before any count is known only page 1 is reachable.
    pub fn go_to(&mut self, page: u32) -> bool {
        let last = self.total_pages().max(1);
        let target = page.clamp(1, last);
        let changed = target != self.page;
        self.page = target;
        changed
    }

    /// Back to page 1, e.g. after a filter change
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// "Page 2 of 3"
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.page, self.total_pages().max(1))
    }

    /// Page control with the current page bracketed: "1 [2] 3"
    pub fn control(&self) -> String {
        self.pages()
            .iter()
            .map(|&p| {
                if p == self.page {
                    format!("[{}]", p)
                } else {
                    p.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_numbers_rounds_up() {
        assert_eq!(page_numbers(25, 10), vec![1, 2, 3]);
        assert_eq!(page_numbers(30, 10), vec![1, 2, 3]);
        assert_eq!(page_numbers(31, 10), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_page_numbers_edge_cases() {
        assert!(page_numbers(0, 10).is_empty());
        assert_eq!(page_numbers(3, 0), vec![1, 2, 3]);
        assert_eq!(page_numbers(1, 10), vec![1]);
    }

    #[test]
    fn test_paginator_navigation() {
        let mut p = Paginator::new(10);
        p.set_count(25);

        assert!(!p.previous());
        assert!(p.next());
        assert!(p.next());
        assert_eq!(p.page(), 3);
        assert!(!p.next());
        assert_eq!(p.label(), "Page 3 of 3");
        assert_eq!(p.control(), "1 2 [3]");
    }

    #[test]
    fn test_go_to_clamps() {
        let mut p = Paginator::new(10);
        p.set_count(25);

        p.go_to(9);
        assert_eq!(p.page(), 3);
        p.go_to(0);
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn test_update_from_page() {
        let mut p = Paginator::new(10);
        let mut page: Page<u32> = Page::empty();
        page.count = 42;
        p.update_from(&page);
        assert_eq!(p.total_pages(), 5);
    }
}
