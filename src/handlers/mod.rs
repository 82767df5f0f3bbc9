use axum::response::Response;
use serde::Serialize;

use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod auth;
pub mod comments;
pub mod events;
pub mod posts;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "queueup-api",
    };

    success(payload, "Health check successful")
}

/// Shared bounds for list pagination: `limit` between 1 and 100,
/// `page` 1-based.
pub(crate) fn validate_pagination(
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<(), AppError> {
    if let Some(limit) = limit {
        if !(1..=100).contains(&limit) {
            return Err(AppError::ValidationError(
                "limit must be between 1 and 100".to_string(),
            ));
        }
    }

    if let Some(page) = page {
        if page < 1 {
            return Err(AppError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_bounds_are_enforced() {
        assert!(validate_pagination(None, None).is_ok());
        assert!(validate_pagination(Some(1), Some(1)).is_ok());
        assert!(validate_pagination(Some(3), Some(100)).is_ok());

        assert!(validate_pagination(None, Some(0)).is_err());
        assert!(validate_pagination(None, Some(101)).is_err());
        assert!(validate_pagination(Some(0), None).is_err());
    }
}
