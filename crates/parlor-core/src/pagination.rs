//! Skip/limit pagination for list projections
//!
//! Every list operation in the engines takes a [`Page`] and returns a
//! [`Paged`] result whose [`PageInfo`] is computed, never stored, so
//! `has_more` cannot drift out of sync with the underlying data.

use serde::{Deserialize, Serialize};

/// A requested window into a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Items to skip from the front
    pub skip: usize,
    /// Maximum items to return
    pub limit: usize,
}

impl Page {
    /// Default window for request/conversation lists
    pub const DEFAULT_LIMIT: usize = 10;
    /// Hard cap for request/conversation lists
    pub const MAX_LIMIT: usize = 50;
    /// Default window for message history
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;
    /// Hard cap for message history
    pub const MAX_HISTORY_LIMIT: usize = 100;

    /// A window starting at `skip` with the given `limit`
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    /// The default first page for list projections
    pub fn first() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }

    /// The default first page for message history
    pub fn history() -> Self {
        Self::new(0, Self::DEFAULT_HISTORY_LIMIT)
    }

    /// Clamp the limit into `1..=max`.
    pub fn clamped(self, max: usize) -> Self {
        Self {
            skip: self.skip,
            limit: self.limit.clamp(1, max),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::first()
    }
}

/// Computed position of a returned window within the full list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// Items skipped
    pub skip: usize,
    /// Window size requested
    pub limit: usize,
    /// Total items in the full list
    pub total: usize,
    /// Whether items remain past this window
    pub has_more: bool,
}

impl PageInfo {
    /// Describe the window `page` cut out of a list of `total` items
    pub fn new(page: Page, total: usize) -> Self {
        Self {
            skip: page.skip,
            limit: page.limit,
            total,
            has_more: page.skip + page.limit < total,
        }
    }
}

/// A window of items plus its position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paged<T> {
    /// The items in this window
    pub items: Vec<T>,
    /// Where the window sits in the full list
    pub page: PageInfo,
}

impl<T> Paged<T> {
    /// Cut the requested window out of an already-sorted list.
    pub fn slice(sorted: Vec<T>, page: Page) -> Self {
        let total = sorted.len();
        let items = sorted
            .into_iter()
            .skip(page.skip)
            .take(page.limit)
            .collect();
        Self {
            items,
            page: PageInfo::new(page, total),
        }
    }
}
