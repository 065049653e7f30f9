use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;

/// Query parameters for the article listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Comma-separated tag list
    pub tags: Option<String>,
    pub author: Option<String>,
}

impl ListArticlesQuery {
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A window over a larger result set
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
            has_next: (offset.saturating_add(limit) as u64) < total,
            has_previous: offset > 0,
        }
    }
}
