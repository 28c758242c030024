/// User management endpoints
///
/// - `GET /api/users` - List users (admin, manager)
/// - `POST /api/users` - Create a user (admin)
///
/// Roles are fixed at creation; there is no update endpoint.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdesk_shared::{
    auth::{
        authorization::{authorize_user, UserAction},
        middleware::AuthContext,
        password,
    },
    models::{
        activity_log::{ActivityLog, CreateActivityLog},
        user::{CreateUser, Role, User},
    },
};
use validator::Validate;

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,

    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    pub password: String,

    /// `admin`, `manager` or `staff`
    pub role: String,

    /// Whether the account may log in
    #[serde(default = "default_status")]
    pub status: bool,
}

fn default_status() -> bool {
    true
}

impl CreateUserRequest {
    /// Runs field validation and parses the role
    fn validated(&self) -> ApiResult<Role> {
        self.validate()?;
        password::validate_password_length(&self.password)
            .map_err(|message| ApiError::field("password", message))?;

        Ok(self.role.parse::<Role>()?)
    }
}

/// Lists all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Value>> {
    authorize_user(UserAction::ViewAny, &auth.actor)?;

    let users = User::list(&state.db).await?;

    Ok(Json(json!({ "data": users })))
}

/// Creates a user
///
/// # Errors
///
/// - `403 Forbidden`: caller is not an admin
/// - `422 Unprocessable Entity`: invalid fields or email already taken
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    authorize_user(UserAction::Create, &auth.actor)?;

    let Json(req) = payload?;
    let role = req.validated()?;

    if User::email_exists(&state.db, &req.email).await? {
        return Err(ApiError::field("email", "The email has already been taken."));
    }

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    // The unique index still guards a concurrent insert of the same email
    let user = User::create_tx(
        &mut tx,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role,
            active: req.status,
        },
    )
    .await?;

    ActivityLog::append_tx(
        &mut tx,
        CreateActivityLog::user_created(auth.user_id(), &user.email),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        created_by = %auth.user_id(),
        "User created"
    );

    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(role: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            password: password.to_string(),
            role: role.to_string(),
            status: true,
        }
    }

    #[test]
    fn test_valid_request() {
        assert_eq!(request("manager", "secret1").validated().unwrap(), Role::Manager);
    }

    #[test]
    fn test_short_password_rejected() {
        match request("staff", "abc").validated() {
            Err(ApiError::ValidationError(details)) => assert_eq!(details[0].field, "password"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        match request("owner", "secret1").validated() {
            Err(ApiError::ValidationError(details)) => assert_eq!(details[0].field, "role"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_defaults_to_active() {
        let req: CreateUserRequest = serde_json::from_value(json!({
            "name": "Dana",
            "email": "dana@example.com",
            "password": "secret1",
            "role": "staff"
        }))
        .unwrap();

        assert!(req.status);
    }
}
