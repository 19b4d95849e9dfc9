// handlers/mod.rs - Two-tier handler architecture
//
// Public (no auth) -> Protected (JWT auth + fresh permission lookup)
pub mod public; // Site reads, related content and login
pub mod protected; // whoami and the /api/admin surface

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::store::{ListFilter, Page};

/// `?tag=&page=&limit=` on listing endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Resolve to a store filter; page is 1-based, limit clamped to the API maximum
    pub fn to_filter(&self, api: &ApiConfig, active_only: bool) -> (ListFilter, u32, u32) {
        let limit = self
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(api.default_page_size)
            .min(api.max_page_size);
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);

        let filter = ListFilter {
            active_only,
            tag: self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(String::from),
            offset: (page - 1).saturating_mul(limit),
            limit: Some(limit),
        };
        (filter, page, limit)
    }
}

/// Listing envelope payload
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit as u64) };
        Self {
            items,
            total,
            page,
            limit,
            pages,
        }
    }

    pub fn from_page<S>(page: Page<S>, page_no: u32, limit: u32, map: impl Fn(S) -> T) -> Self {
        Self::new(page.items.into_iter().map(map).collect(), page.total, page_no, limit)
    }
}
