//! Error responses shared by every route
//!
//! Every failure is rendered as `{"errors": [{"message", "field"?}]}`.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::DbError;
use crate::services::ServiceError;

pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// One entry of an error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl FieldError {
    pub fn new(message: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request parameters")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    BadRequest(String),

    #[error("Not authorized")]
    Unauthorized,

    #[error("Not Found")]
    NotFound,

    #[error("{message}")]
    Duplicate { message: String, field: String },

    /// Message is sent to the client as is; keep it opaque
    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal() -> Self {
        ApiError::Internal(INTERNAL_MESSAGE.to_string())
    }

    /// Log a failed call to an external service and hide the details
    pub fn upstream(service: &str, err: ServiceError) -> Self {
        error!("{} request failed: {}", service, err);

        match err {
            ServiceError::Conversion(_) | ServiceError::Template(_) => ApiError::internal(),
            _ => ApiError::Internal(format!("Error connecting to {service}")),
        }
    }

    fn errors(&self) -> Vec<FieldError> {
        match self {
            ApiError::Validation(errors) => errors.clone(),
            ApiError::Duplicate { message, field } => {
                vec![FieldError::new(message.as_str(), Some(field))]
            }
            other => vec![FieldError::new(other.to_string(), None)],
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Duplicate { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            errors: self.errors(),
        })
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate { field } => ApiError::Duplicate {
                message: "Field conflict; record already exists".to_string(),
                field,
            },
            DbError::NotFound => ApiError::NotFound,
            DbError::Database(e) => {
                error!("Database error: {}", e);
                ApiError::internal()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn test_error_bodies() {
        let (status, body) = body_of(ApiError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"errors": [{"message": "Not Found"}]}));

        let (status, body) = body_of(ApiError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errors"][0]["message"], "Not authorized");

        let (status, body) = body_of(ApiError::Validation(vec![
            FieldError::new("name is required", Some("name")),
            FieldError::new("No id or url specified", None),
        ]))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "name");
        assert!(body["errors"][1].get("field").is_none());
    }

    #[actix_web::test]
    async fn test_db_errors() {
        let (status, body) = body_of(DbError::Duplicate { field: "email".into() }.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["errors"][0]["field"], "email");

        let (status, body) = body_of(DbError::Database(sqlx::Error::RowNotFound).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errors"][0]["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_upstream_is_opaque() {
        let err = ApiError::upstream(
            "spotify",
            ServiceError::Upstream {
                status: 401,
                message: "Invalid client".into(),
            },
        );
        assert_eq!(err.to_string(), "Error connecting to spotify");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
