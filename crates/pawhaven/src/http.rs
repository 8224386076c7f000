//! Shared response helpers used by every module router.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::access::PermissionError;
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({ "error": message.into() });
    (status, Json(payload)).into_response()
}

pub(crate) fn validation_response(errors: &ValidationErrors) -> Response {
    let payload = json!({
        "error": errors.to_string(),
        "fields": errors,
    });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

pub(crate) fn permission_response(error: &PermissionError) -> Response {
    error_response(StatusCode::FORBIDDEN, error.to_string())
}

pub(crate) fn repository_response(error: &RepositoryError) -> Response {
    let status = match error {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict { .. }
        | RepositoryError::StatusMismatch { .. }
        | RepositoryError::PetUnavailable { .. } => StatusCode::CONFLICT,
        RepositoryError::MissingReference { .. } => StatusCode::BAD_REQUEST,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error.to_string())
}

/// `?page=` / `?page_size=` query parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Paginated envelope shared by every listing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub next: Option<usize>,
    pub previous: Option<usize>,
    pub results: Vec<T>,
}

/// Page size defaults and ceiling, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: usize,
    pub max_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 12,
            max_size: 100,
        }
    }
}

/// The requested page lies past the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page {page} is out of range")]
pub struct PageOutOfRange {
    pub page: usize,
}

impl PageLimits {
    /// Slices `items` into the requested 1-based page. Page 1 of an empty list is valid.
    pub fn paginate<T>(
        &self,
        items: Vec<T>,
        request: PageRequest,
    ) -> Result<Page<T>, PageOutOfRange> {
        let size = request
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(self.default_size)
            .min(self.max_size)
            .max(1);
        let page = request.page.unwrap_or(1);
        let count = items.len();
        let pages = count.div_ceil(size).max(1);
        if page == 0 || page > pages {
            return Err(PageOutOfRange { page });
        }

        let results = items
            .into_iter()
            .skip((page - 1) * size)
            .take(size)
            .collect();

        Ok(Page {
            count,
            page,
            next: (page < pages).then_some(page + 1),
            previous: (page > 1).then(|| page - 1),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_links_neighbouring_pages() {
        let limits = PageLimits::default();
        let page = limits
            .paginate(
                (1..=30).collect::<Vec<_>>(),
                PageRequest {
                    page: Some(2),
                    page_size: None,
                },
            )
            .expect("page exists");

        assert_eq!(page.count, 30);
        assert_eq!(page.results.first(), Some(&13));
        assert_eq!(page.previous, Some(1));
        assert_eq!(page.next, Some(3));
    }

    #[test]
    fn paginate_caps_page_size_and_rejects_out_of_range_pages() {
        let limits = PageLimits::default();
        let page = limits
            .paginate(
                (0..250).collect::<Vec<_>>(),
                PageRequest {
                    page: None,
                    page_size: Some(500),
                },
            )
            .expect("first page");
        assert_eq!(page.results.len(), 100);

        let err = limits
            .paginate(vec![1, 2, 3], PageRequest { page: Some(2), page_size: None })
            .expect_err("only one page");
        assert_eq!(err, PageOutOfRange { page: 2 });
    }

    #[test]
    fn empty_listing_still_has_a_first_page() {
        let page = PageLimits::default()
            .paginate(Vec::<u8>::new(), PageRequest::default())
            .expect("first page");
        assert_eq!(page.count, 0);
        assert!(page.next.is_none());
    }
}
