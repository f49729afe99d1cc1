use axum::Json;
use serde::Serialize;

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

/// Clamps raw query parameters to a sane 1-based page and page size.
pub fn page_and_limit(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// Pagination metadata carried in list responses, mirroring the
/// `{page, limit, total, pages}` block the client expects.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Uniform success envelope: `{ success, data?, message?, pagination? }`.
/// Error envelopes come from `ApiError::into_response`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: None,
        })
    }

    pub fn page(data: T, pagination: Pagination) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: Some(pagination),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_and_limit_defaults_and_clamps() {
        assert_eq!(page_and_limit(None, None), (1, 10));
        assert_eq!(page_and_limit(Some(0), Some(0)), (1, 1));
        assert_eq!(page_and_limit(Some(-3), Some(1000)), (1, 100));
        assert_eq!(page_and_limit(Some(4), Some(25)), (4, 25));
    }

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(1, 10, 0).pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).pages, 2);
    }

    #[test]
    fn offset_is_one_based() {
        assert_eq!(Pagination::new(1, 10, 50).offset(), 0);
        assert_eq!(Pagination::new(3, 10, 50).offset(), 20);
    }

    #[test]
    fn envelope_omits_empty_fields() {
        let Json(body) = ApiResponse::ok(42);
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn envelope_carries_pagination() {
        let Json(body) = ApiResponse::page(vec![1, 2], Pagination::new(2, 2, 5));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["pagination"]["pages"], 3);
        assert_eq!(json["pagination"]["page"], 2);
    }
}
