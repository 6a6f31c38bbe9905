//! Query parameters and list envelopes shared by list endpoints

use axum::Json;
use owa_common::db::pagination::DEFAULT_LIMIT;
use owa_common::db::{Page, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ApiError, ApiResult};

/// `?page=&limit=` for list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_LIMIT))
    }
}

/// Wrap a page as `{<collection>: [...], page, limit, total, total_pages}`
pub fn listing<T: Serialize>(collection: &str, page: Page<T>) -> ApiResult<Json<Value>> {
    let items = serde_json::to_value(&page.items)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize {}: {}", collection, e)))?;

    let mut body = json!({
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
        "total_pages": page.total_pages,
    });
    body[collection] = items;

    Ok(Json(body))
}

/// Wrap a single resource as `{<name>: {...}}`
pub fn single<T: Serialize>(name: &str, item: T) -> ApiResult<Json<Value>> {
    let value = serde_json::to_value(item)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize {}: {}", name, e)))?;

    let mut body = json!({});
    body[name] = value;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use owa_common::db::pagination::{calculate_pagination, MAX_LIMIT};

    #[test]
    fn test_page_request_defaults_and_clamps() {
        let query = ListQuery::default();
        assert_eq!(query.page_request(), PageRequest::new(1, DEFAULT_LIMIT));

        let query = ListQuery {
            page: Some(3),
            limit: Some(10_000),
        };
        assert_eq!(query.page_request().limit, MAX_LIMIT);

        let query = ListQuery {
            page: None,
            limit: Some(0),
        };
        assert_eq!(query.page_request().limit, 1);
    }

    #[test]
    fn test_listing_envelope() {
        let pagination = calculate_pagination(3, PageRequest::new(1, 2));
        let page = Page::new(vec!["a", "b"], 3, pagination);

        let Json(body) = listing("tags", page).unwrap();
        assert_eq!(body["tags"], json!(["a", "b"]));
        assert_eq!(body["total"], 3);
        assert_eq!(body["total_pages"], 2);
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 2);
    }
}
