/// First-admin provisioning
///
/// Users can only be created by an admin, so a fresh database needs one
/// seeded account. When `BOOTSTRAP_ADMIN_*` is configured and the user
/// table is empty, an active admin is created at startup. A populated table
/// is left untouched.

use sqlx::PgPool;
use taskdesk_shared::{
    auth::password,
    models::user::{CreateUser, Role, User},
};

use crate::config::BootstrapAdmin;

/// Creates the configured admin if no users exist
///
/// Returns the created user, or `None` when users already exist.
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> anyhow::Result<Option<User>> {
    if User::count(pool).await? > 0 {
        tracing::debug!("Users present, skipping admin bootstrap");
        return Ok(None);
    }

    password::validate_password_length(&admin.password).map_err(anyhow::Error::msg)?;
    let password_hash = password::hash_password(&admin.password)?;

    let user = User::create(
        pool,
        CreateUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            role: Role::Admin,
            active: true,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Bootstrap admin created");
    Ok(Some(user))
}
