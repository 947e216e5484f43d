//! Pagination value objects shared by every list endpoint

use serde::{Deserialize, Serialize};

use crate::DomainError;

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 200;

/// One-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// # Errors
    ///
    /// Returns a validation error when `page` is zero or `page_size` is
    /// outside `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.page == 0 {
            return Err(DomainError::validation("page must be at least 1"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(DomainError::validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }
}

/// A page of results as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn first_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl<T> Page<T> {
    /// Empty first page
    #[must_use]
    pub const fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size,
        }
    }

    /// Number of pages needed for `total` items (at least 1)
    #[must_use]
    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

/// Number of pages needed to show `total` items, never less than one
#[must_use]
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 || total == 0 {
        return 1;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}
