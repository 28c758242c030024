/// Authentication endpoints
///
/// - `POST /api/login` - Exchange credentials for an access token
/// - `POST /api/logout` - Revoke the presented token
///
/// Tokens are HS256 JWTs carrying the user ID, role and a token ID (`jti`).
/// Logout records the `jti` in `revoked_tokens`; the authentication layer
/// rejects revoked IDs until they expire.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::{
        revoked_token::RevokedToken,
        user::{User, UserSummary},
    },
};
use validator::Validate;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,

    /// Always `Bearer`
    pub token_type: String,

    pub expires_at: DateTime<Utc>,

    pub user: UserSummary,
}

/// Login endpoint
///
/// # Errors
///
/// - `422 Unprocessable Entity`: malformed body
/// - `401 Unauthorized`: unknown email or wrong password
/// - `403 Forbidden`: account is inactive
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    if !user.active {
        tracing::info!(user_id = %user.id, "Login rejected: inactive account");
        return Err(ApiError::Forbidden("Account is inactive".to_string()));
    }

    let claims = jwt::Claims::new(
        user.id,
        user.role,
        Duration::hours(state.config.jwt.ttl_hours),
    );
    let access_token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_at: claims.expires_at(),
        user: user.summary(),
    }))
}

/// Logout endpoint
///
/// Revokes the token used for this request. Logging out twice with the same
/// token fails the second time with 401, since the token is already revoked.
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Value>> {
    RevokedToken::revoke(&state.db, auth.jti, auth.user_id(), auth.expires_at).await?;

    tracing::info!(user_id = %auth.user_id(), jti = %auth.jti, "User logged out");

    Ok(Json(json!({ "message": "Logged out successfully" })))
}
