use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{BoxError, Json};
use geonear_core::{DirectoryError, GeoError, SearchError, StoreError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "invalid_argument",
            message: message.into(),
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "unauthorized",
            message: message.into(),
        }
    }

    pub(crate) fn payload_too_large(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            code: "payload_too_large",
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "not_found",
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: "conflict",
            message: message.into(),
        }
    }

    fn request_timeout() -> Self {
        Self {
            status: StatusCode::REQUEST_TIMEOUT,
            code: "request_timeout",
            message: "request timed out".to_string(),
        }
    }

    pub(crate) fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            code: "not_ready",
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "internal",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                code: self.code,
                message: self.message,
            }),
        )
            .into_response()
    }
}

pub(crate) fn map_json_rejection(rejection: JsonRejection) -> ApiError {
    let status = rejection.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large("request body exceeds configured size limit");
    }
    if status == StatusCode::UNSUPPORTED_MEDIA_TYPE {
        return ApiError::invalid_argument("content-type must be application/json");
    }
    ApiError::invalid_argument("invalid JSON payload")
}

pub(crate) fn map_query_rejection(rejection: QueryRejection) -> ApiError {
    ApiError::invalid_argument(format!("invalid query string: {}", rejection.body_text()))
}

pub(crate) fn map_geo_error(error: GeoError) -> ApiError {
    ApiError::invalid_argument(error.to_string())
}

pub(crate) fn map_directory_error(error: DirectoryError) -> ApiError {
    match error {
        DirectoryError::UserNotFound(_) => ApiError::not_found(error.to_string()),
        DirectoryError::UserExists(_)
        | DirectoryError::DuplicateUsername(_)
        | DirectoryError::DuplicateEmail(_) => ApiError::conflict(error.to_string()),
        DirectoryError::Location(error) => map_geo_error(error),
        DirectoryError::InvalidUsername | DirectoryError::InvalidEmail => {
            ApiError::invalid_argument(error.to_string())
        }
    }
}

pub(crate) fn map_store_error(error: StoreError) -> ApiError {
    tracing::error!(%error, "point store read failed");
    ApiError::service_unavailable(error.to_string())
}

pub(crate) fn map_search_error(error: SearchError) -> ApiError {
    match error {
        SearchError::OriginNotSet(_) => ApiError::not_found(error.to_string()),
        SearchError::Storage(error) => map_store_error(error),
    }
}

pub(crate) async fn handle_middleware_error(error: BoxError) -> Response {
    if error.is::<tower::timeout::error::Elapsed>() {
        return ApiError::request_timeout().into_response();
    }

    tracing::error!(%error, "middleware error");
    ApiError::internal("internal middleware error").into_response()
}
