//! Pagination types for list operations.

use serde::{Deserialize, Serialize};

/// A normalized request for a page of results.
///
/// Pages are 1-indexed. Construct through [`PageRequest::normalized`] so
/// the repository can trust `page >= 1` and `1 <= size <= MAX_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// The size used when the requested size is out of range.
    pub const DEFAULT_SIZE: u32 = 10;
    /// The maximum allowed page size.
    pub const MAX_SIZE: u32 = 100;

    /// Applies the normalization policy: `page < 1` becomes 1, and a size
    /// outside `1..=MAX_SIZE` becomes `DEFAULT_SIZE`.
    #[must_use]
    pub fn normalized(page: i64, size: i64) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let size = match u32::try_from(size) {
            Ok(size) if (1..=Self::MAX_SIZE).contains(&size) => size,
            _ => Self::DEFAULT_SIZE,
        };
        Self { page, size }
    }

    /// Returns the 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Returns the page size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.size)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: Self::DEFAULT_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_offset() {
        let req = PageRequest::normalized(3, 25);
        assert_eq!(req.page(), 3);
        assert_eq!(req.size(), 25);
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 25);
    }

    #[test]
    fn test_page_below_one_becomes_first_page() {
        assert_eq!(PageRequest::normalized(0, 10).page(), 1);
        assert_eq!(PageRequest::normalized(-4, 10).page(), 1);
        assert_eq!(PageRequest::normalized(0, 10).offset(), 0);
    }

    #[test]
    fn test_out_of_range_size_falls_back_to_default() {
        assert_eq!(PageRequest::normalized(1, 0).size(), PageRequest::DEFAULT_SIZE);
        assert_eq!(PageRequest::normalized(1, -1).size(), PageRequest::DEFAULT_SIZE);
        assert_eq!(PageRequest::normalized(1, 101).size(), PageRequest::DEFAULT_SIZE);
        assert_eq!(PageRequest::normalized(1, 100).size(), 100);
        assert_eq!(PageRequest::normalized(1, 1).size(), 1);
    }

    #[test]
    fn test_default_is_first_page() {
        let req = PageRequest::default();
        assert_eq!(req, PageRequest::normalized(1, 10));
    }
}
