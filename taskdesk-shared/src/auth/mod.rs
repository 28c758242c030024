/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: access token generation and validation
/// - [`middleware`]: bearer-token request authentication producing an [`middleware::AuthContext`]
/// - [`assignment`]: who may assign a task to whom
/// - [`visibility`]: which tasks an actor can open or list
/// - [`authorization`]: task, user and activity-log policies
///
/// Everything below `assignment`, `visibility` and `authorization` is pure:
/// the authenticated [`crate::models::user::Actor`] is always an explicit
/// argument.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::assignment::can_assign;
/// use taskdesk_shared::models::user::{Actor, Role};
/// use uuid::Uuid;
///
/// let manager = Actor::new(Uuid::new_v4(), Role::Manager);
/// let staff = Actor::new(Uuid::new_v4(), Role::Staff);
/// assert!(can_assign(&manager, &staff));
/// assert!(!can_assign(&staff, &manager));
/// ```

pub mod assignment;
pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod visibility;
