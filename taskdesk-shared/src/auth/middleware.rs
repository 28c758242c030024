/// Request authentication for Axum
///
/// Validates the `Authorization: Bearer <token>` header, rejects revoked
/// tokens, reloads the user and refuses inactive accounts. The API wires
/// [`authenticate`] into a `from_fn_with_state` layer which stores the
/// resulting [`AuthContext`] in the request extensions for handlers.
///
/// | Failure | Status |
/// |---|---|
/// | no header, malformed header, bad/expired/revoked token | 401 |
/// | user no longer exists | 401 |
/// | user inactive | 403 |
///
/// # Example
///
/// ```no_run
/// use axum::{extract::{Request, State}, middleware::Next, response::Response};
/// use sqlx::PgPool;
/// use taskdesk_shared::auth::middleware::{authenticate, AuthError};
///
/// async fn auth_layer(
///     State(pool): State<PgPool>,
///     mut req: Request,
///     next: Next,
/// ) -> Result<Response, AuthError> {
///     let auth = authenticate(&pool, "secret", req.headers()).await?;
///     req.extensions_mut().insert(auth);
///     Ok(next.run(req).await)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::revoked_token::RevokedToken;
use crate::models::user::{Actor, User};

/// Authentication context added to request extensions
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdesk_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.actor.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Authenticated user, with the role as currently stored
    pub actor: Actor,

    /// Token ID, for logout
    pub jti: Uuid,

    /// Token expiry
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.actor.id
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not a bearer token
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token was revoked by logout
    Revoked,

    /// Token subject no longer exists
    UnknownUser,

    /// Account is deactivated
    InactiveUser,

    /// Database error
    DatabaseError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidFormat(_)
            | AuthError::InvalidToken(_)
            | AuthError::Revoked
            | AuthError::UnknownUser => StatusCode::UNAUTHORIZED,
            AuthError::InactiveUser => StatusCode::FORBIDDEN,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AuthError::MissingCredentials => ("unauthenticated", "Unauthenticated".to_string()),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => {
                ("unauthenticated", msg.clone())
            }
            AuthError::Revoked => ("unauthenticated", "Token has been revoked".to_string()),
            AuthError::UnknownUser => ("unauthenticated", "Unauthenticated".to_string()),
            AuthError::InactiveUser => ("forbidden", "Inactive user".to_string()),
            AuthError::DatabaseError(_) => {
                ("internal_error", "An internal error occurred".to_string())
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::DatabaseError(ref e) = self {
            tracing::error!(error = %e, "Database error during authentication");
        }

        let status = self.status_code();
        let (code, message) = self.code_and_message();

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the bearer token from request headers
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Authenticates a request from its headers
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer { .. } => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken("Invalid token".to_string()),
    })?;

    let revoked = RevokedToken::is_revoked(pool, claims.jti)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;
    if revoked {
        return Err(AuthError::Revoked);
    }

    let user = User::find_by_id(pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    if !user.active {
        tracing::warn!(user_id = %user.id, "Rejected request from inactive user");
        return Err(AuthError::InactiveUser);
    }

    Ok(AuthContext {
        actor: user.actor(),
        jti: claims.jti,
        expires_at: claims.expires_at(),
    })
}
