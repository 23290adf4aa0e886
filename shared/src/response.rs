//! Paginated response container

use serde::{Deserialize, Serialize};

/// A single page of results plus paging metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
    /// Total matching items across all pages
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size as u64) as u32
        };
        Self {
            items,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}
