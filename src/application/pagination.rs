//! Page-index pagination.
//!
//! Collections are addressed as `?page=<n>`; page `n` starts at item
//! `n * page_size` of the collection ordered by id.

use std::num::NonZeroU32;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page `{0}` is not a non-negative integer")]
    InvalidPage(String),
}

/// Parse the raw `page` query value; absent means the first page.
pub fn parse_page(raw: Option<&str>) -> Result<u32, PaginationError> {
    match raw {
        None => Ok(0),
        Some(value) => value
            .trim()
            .parse::<u32>()
            .map_err(|_| PaginationError::InvalidPage(value.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: u32,
    size: NonZeroU32,
}

impl PageWindow {
    pub fn new(page: u32, size: NonZeroU32) -> Self {
        Self { page, size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items a full page holds.
    pub fn size(&self) -> usize {
        self.size.get() as usize
    }

    /// Row offset for SQL; saturates far past any real collection.
    pub fn offset(&self) -> i64 {
        let offset = u64::from(self.page) * u64::from(self.size.get());
        i64::try_from(offset).unwrap_or(i64::MAX)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).expect("non-zero")
    }

    #[test]
    fn missing_page_defaults_to_zero() {
        assert_eq!(parse_page(None), Ok(0));
        assert_eq!(parse_page(Some("4")), Ok(4));
        assert_eq!(parse_page(Some(" 2 ")), Ok(2));
    }

    #[test]
    fn malformed_pages_are_rejected() {
        for raw in ["", "abc", "-1", "1.5", "99999999999"] {
            assert_eq!(
                parse_page(Some(raw)),
                Err(PaginationError::InvalidPage(raw.to_string())),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn offset_is_page_times_size() {
        let window = PageWindow::new(3, size(50));
        assert_eq!(window.offset(), 150);
        assert_eq!(window.limit(), 50);
        assert_eq!(window.size(), 50);
    }

    #[test]
    fn offset_saturates() {
        let window = PageWindow::new(u32::MAX, size(u32::MAX));
        assert_eq!(window.offset(), i64::MAX);
    }
}
