use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::WithRejection;
use serde::Serialize;
use tracing::error;

use models::errors::ModelError;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// Error body shared by every endpoint: `{statusCode, error, message}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// Extractors whose rejections render as `ErrorBody` instead of plain text.
pub type ApiJson<T> = WithRejection<Json<T>, JsonApiError>;
pub type ApiQuery<T> = WithRejection<Query<T>, JsonApiError>;
pub type ApiPath<T> = WithRejection<Path<T>, JsonApiError>;

#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn unauthorized(detail: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.to_string()))
    }

    fn internal(source: &dyn std::fmt::Display) -> Self {
        error!(error = %source, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
    }

    /// Malformed request input. A body that parses but has the wrong shape is
    /// still a 400; other statuses (415, 413) pass through.
    fn rejected(status: StatusCode, detail: String) -> Self {
        let status = if status == StatusCode::UNPROCESSABLE_ENTITY { StatusCode::BAD_REQUEST } else { status };
        Self::new(status, status.canonical_reason().unwrap_or("Bad Request"), Some(detail))
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        Self::rejected(r.status(), r.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::rejected(r.status(), r.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        Self::rejected(r.status(), r.body_text())
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            error: self.title.to_string(),
            message: self.detail.unwrap_or_else(|| self.title.to_string()),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(msg))
            }
            ServiceError::InsufficientStock { .. } => {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(e.to_string()))
            }
            ServiceError::NotFound(msg) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ServiceError::Conflict(msg) => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(msg)),
            ServiceError::Db(_) | ServiceError::Model(ModelError::Db(_)) => JsonApiError::internal(&e),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Bad Request", Some(msg)),
            AuthError::Conflict => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string())),
            AuthError::NotFound => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            AuthError::AccessDenied => JsonApiError::new(StatusCode::FORBIDDEN, "Forbidden", Some(e.to_string())),
            AuthError::Unauthorized => JsonApiError::unauthorized("invalid or expired token"),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => JsonApiError::internal(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Model(ModelError::Validation("x".into())), StatusCode::BAD_REQUEST),
            (
                ServiceError::InsufficientStock { product_id: Uuid::nil(), requested: 10, available: 5 },
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::Db("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(JsonApiError::from(AuthError::AccessDenied).status, StatusCode::FORBIDDEN);
        assert_eq!(JsonApiError::from(AuthError::Unauthorized).status, StatusCode::UNAUTHORIZED);
        assert_eq!(JsonApiError::from(AuthError::Conflict).status, StatusCode::CONFLICT);
        assert_eq!(JsonApiError::from(AuthError::Repository("db".into())).status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unprocessable_bodies_become_bad_request() {
        let err = JsonApiError::rejected(StatusCode::UNPROCESSABLE_ENTITY, "missing field `quantity`".into());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.title, "Bad Request");
        let err = JsonApiError::rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json".into());
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = JsonApiError::from(ServiceError::Db("password=hunter2".into()));
        assert!(err.detail.is_none());
    }
}
