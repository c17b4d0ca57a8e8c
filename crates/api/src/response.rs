//! Shared response envelope types for API handlers.
//!
//! Single resources use `{ "data": ... }` ([`DataResponse`]). Listings use
//! `{ "info": { count, pages, next, prev }, "results": [...] }`
//! ([`PaginatedResponse`]), with `next`/`prev` rebuilt from the request URI.

use axum::http::Uri;
use catalog_core::pagination::Page;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub count: i64,
    pub pages: i64,
    pub next: Option<String>,
    pub prev: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub info: PageInfo,
    pub results: Vec<T>,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Wrap a core page. An empty page is still a normal response.
    pub fn new(page: Page<T>, uri: &Uri) -> Self {
        let next = page.has_next().then(|| page_link(uri, page.page + 1));
        let prev = page.has_prev().then(|| page_link(uri, page.page - 1));
        Self {
            info: PageInfo {
                count: page.total,
                pages: page.pages(),
                next,
                prev,
            },
            results: page.results,
        }
    }
}

/// Same path and query with `page` replaced.
fn page_link(uri: &Uri, page: i64) -> String {
    let mut params: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty() && *p != "page" && !p.starts_with("page="))
        .collect();
    let page_param = format!("page={page}");
    params.push(&page_param);
    format!("{}?{}", uri.path(), params.join("&"))
}
