//! Pagination utilities for service layer
//!
//! `Pagination` is what callers ask for, `Page` is what they get back.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// 0-based page index
    #[serde(default)]
    pub page: u64,
    /// items per page
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_size() -> u64 { DEFAULT_PAGE_SIZE }

impl Pagination {
    pub fn new(page: u64, size: u64) -> Self { Self { page, size } }

    /// Clamp size to `1..=MAX_PAGE_SIZE` and page so that the row offset
    /// stays within `i64`; returns `(page_index, size)`.
    pub fn normalize(self) -> (u64, u64) {
        let size = self.size.clamp(1, MAX_PAGE_SIZE);
        let last_page = i64::MAX as u64 / size;
        (self.page.min(last_page), size)
    }

    /// Row offset of the first item on this page.
    pub fn offset(self) -> u64 {
        let (page, size) = self.normalize();
        page * size
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 0, size: DEFAULT_PAGE_SIZE } }
}

/// One page of results plus totals.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pagination: Pagination, total_elements: u64) -> Self {
        let (page, size) = pagination.normalize();
        Self { content, page, size, total_elements, total_pages: total_elements.div_ceil(size) }
    }

    /// Slice an in-memory, already ordered result set.
    pub fn from_sorted(all: Vec<T>, pagination: Pagination) -> Self {
        let total = all.len() as u64;
        let (_, size) = pagination.normalize();
        let content = all
            .into_iter()
            .skip(pagination.offset().min(total) as usize)
            .take(size as usize)
            .collect();
        Self::new(content, pagination, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}
