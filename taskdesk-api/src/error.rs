/// Error handling for the API server
///
/// Every handler returns `Result<T, ApiError>`. Library errors convert into
/// `ApiError` through `From`, so handlers use `?` throughout. Bodies have a
/// fixed shape:
///
/// ```json
/// { "error": "validation_error", "message": "...", "details": [{"field": "...", "message": "..."}] }
/// ```
///
/// Internal failures (database, hashing, token signing) are logged with the
/// full error and answered with a generic message.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use taskdesk_shared::auth::jwt::JwtError;
use taskdesk_shared::auth::middleware::AuthError;
use taskdesk_shared::auth::password::PasswordError;
use taskdesk_shared::error::DomainError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Unprocessable entity (422), malformed input
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unprocessable entity (422), well-formed input breaking a business rule
    RuleViolation(String),

    /// Internal server error (500)
    InternalError(String),
}

impl ApiError {
    /// Validation error on a single field
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) | ApiError::RuleViolation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "forbidden", "validation_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field errors, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::RuleViolation(msg) => write!(f, "Rule violation: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => ("unauthenticated", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::RuleViolation(msg) => ("rule_violation", msg, None),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!(error = %msg, "Internal error");
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Unauthenticated => ApiError::Unauthorized("Unauthenticated".to_string()),
            DomainError::Forbidden(msg) => ApiError::Forbidden(msg),
            DomainError::Validation { field, message } => ApiError::field(field, message),
            DomainError::NotFound(entity) => ApiError::NotFound(format!("{} not found", entity)),
            DomainError::RuleViolation(msg) => ApiError::RuleViolation(msg),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.constraint() == Some("users_email_key") {
                return ApiError::field("email", "The email has already been taken.");
            }
        }

        ApiError::InternalError(format!("Database error: {}", err))
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InactiveUser => ApiError::Forbidden("Inactive user".to_string()),
            AuthError::DatabaseError(msg) => ApiError::InternalError(msg),
            AuthError::MissingCredentials
            | AuthError::InvalidFormat(_)
            | AuthError::InvalidToken(_)
            | AuthError::Revoked
            | AuthError::UnknownUser => ApiError::Unauthorized("Unauthenticated".to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Token errors only reach handlers when issuing a token
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::InternalError(format!("Token operation failed: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // HashMap order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::field("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::field("query", rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");

        let err = ApiError::field("email", "bad");
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }

    #[test]
    fn test_domain_error_status_mapping() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::validation("status", "bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::not_found("Task"), StatusCode::NOT_FOUND),
            (DomainError::rule("bad transition"), StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (domain, expected) in cases {
            assert_eq!(ApiError::from(domain).status_code(), expected);
        }
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            ApiError::from(AuthError::InactiveUser).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AuthError::Revoked).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let err = ApiError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(!body.to_string().contains("PoolTimedOut"));
    }

    #[tokio::test]
    async fn test_validation_body_has_details() {
        let response = ApiError::field("title", "Title is required").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["details"][0]["field"], "title");
        assert_eq!(body["details"][0]["message"], "Title is required");
    }

    #[tokio::test]
    async fn test_rule_violation_body() {
        let response = ApiError::from(DomainError::rule("Cannot change task status from done to pending"))
            .into_response();

        let body = body_json(response).await;
        assert_eq!(body["error"], "rule_violation");
        assert!(body.get("details").is_none());
    }
}
