//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kontor_shared::AppError;
use sea_orm::DbErr;
use serde_json::json;
use tracing::error;

/// Error returned by handlers.
///
/// Renders as `{"error": CODE, "message": text}`. Internal errors are
/// logged and replaced by a generic message.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_internal() {
            error!(error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.public_message(),
            })),
        )
            .into_response()
    }
}

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Wraps a raw driver error for handlers that query without a repository
/// error type.
#[must_use]
pub fn database(e: DbErr) -> ApiError {
    ApiError(AppError::Database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;

    async fn render(e: AppError) -> (StatusCode, serde_json::Value) {
        let response = ApiError(e).into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[rstest]
    #[case(AppError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(AppError::Conflict("taken".into()), StatusCode::BAD_REQUEST, "CONFLICT")]
    #[case(AppError::NotFound("gone".into()), StatusCode::NOT_FOUND, "NOT_FOUND")]
    #[case(AppError::Unauthorized("who".into()), StatusCode::UNAUTHORIZED, "UNAUTHORIZED")]
    #[case(AppError::Forbidden("no".into()), StatusCode::FORBIDDEN, "FORBIDDEN")]
    #[tokio::test]
    async fn test_status_and_code(
        #[case] error: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let (actual, body) = render(error).await;
        assert_eq!(actual, status);
        assert_eq!(body["error"], code);
    }

    #[tokio::test]
    async fn test_database_error_is_masked() {
        let (status, body) = render(AppError::Database("relation users missing".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "An internal error occurred");
    }
}
