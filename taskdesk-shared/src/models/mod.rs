/// Database models for TaskDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: user accounts, roles and the [`user::Actor`] identity
/// - `task`: tasks and the status state machine
/// - `activity_log`: append-only audit trail
/// - `revoked_token`: JWT ids revoked by logout
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser, Role};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Robin Admin".to_string(),
///     email: "robin@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Admin,
///     active: true,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod activity_log;
pub mod revoked_token;
pub mod task;
pub mod user;
