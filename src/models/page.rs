use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Raw paging parameters as they arrive on a query string.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn resolve(&self, default_size: u32, max_size: u32) -> Result<PageRequest, AppError> {
        let page_size = self.limit.unwrap_or(default_size);
        if page_size == 0 || page_size > max_size {
            return Err(AppError::InvalidPage(format!(
                "Page size must be between 1 and {}, got {}",
                max_size, page_size
            )));
        }

        Ok(PageRequest {
            page: self.page.unwrap_or(1),
            page_size,
        })
    }
}

/// A 1-based page number and the number of slots per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn is_first(&self) -> bool {
        self.page == 1
    }
}

/// Listing with a single caller-relative item surfaced on page 1.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PinnedPage<T> {
    pub pinned: Option<T>,
    pub items: Vec<T>,
    pub total_count: usize,
    pub page_count: usize,
    pub page: u32,
    pub page_size: u32,
}

/// A position in a favorites-first page. Placeholders stand where favorites were lifted out.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "item", rename_all = "camelCase")]
pub enum Slot<T> {
    Placeholder,
    Item(T),
}

impl<T> Slot<T> {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Slot::Placeholder)
    }

    pub fn item(&self) -> Option<&T> {
        match self {
            Slot::Item(item) => Some(item),
            Slot::Placeholder => None,
        }
    }
}

/// Listing where the caller's favorites lead the collection on page 1.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesPage<T> {
    pub favorites: Vec<T>,
    pub items: Vec<Slot<T>>,
    pub total_count: usize,
    pub page_count: usize,
    pub page: u32,
    pub page_size: u32,
}
