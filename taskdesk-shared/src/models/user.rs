/// User model, roles and database operations
///
/// Users are created by admins and are never deleted. A user's role is fixed
/// at creation time; the `active` flag gates login and every authenticated
/// request but has no effect on which tasks are visible.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'manager', 'staff');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     role user_role NOT NULL DEFAULT 'staff',
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX users_email_key ON users (LOWER(email));
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{CreateUser, Role, User};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Dana Staff".to_string(),
///     email: "dana@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     role: Role::Staff,
///     active: true,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "DANA@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::DomainError;

/// User roles
///
/// The three roles are not a linear hierarchy: each one carries its own rule
/// set in the policies, so every check matches on the role exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Sees and manages everything
    Admin,

    /// Creates tasks for staff, sees own and staff work
    Manager,

    /// Works on tasks assigned to them
    Staff,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Staff];

    /// Converts role to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(DomainError::validation(
                "role",
                format!("'{}' is not one of admin, manager, staff", other),
            )),
        }
    }
}

/// The identity a rule is evaluated for
///
/// Rules only ever need a user's id and role, so policies take this small
/// `Copy` value instead of a full row. The authenticated actor is always
/// passed explicitly; nothing reads a "current user" from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User ID
    pub id: Uuid,

    /// User role
    pub role: Role,
}

impl Actor {
    /// Creates an actor from its parts
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    /// Whether the actor is an admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User model representing an account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address, unique case-insensitively
    pub email: String,

    /// Argon2id password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Role, fixed at creation
    pub role: Role,

    /// Whether the account may log in, `status` on the wire
    #[serde(rename = "status")]
    pub active: bool,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the rule-engine identity of this user
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }

    /// Returns the public summary embedded in task payloads
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Public subset of a user, embedded in task and log payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserSummary {
    /// Returns the rule-engine identity of this user
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Role
    pub role: Role,

    /// Whether the account may log in
    pub active: bool,
}

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique index
    /// `users_email_key`) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let user = Self::create_tx(&mut tx, data).await?;
        tx.commit().await?;

        Ok(user)
    }

    /// Creates a new user inside an open transaction
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateUser,
    ) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, active, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .bind(data.active)
        .fetch_one(&mut **tx)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, created_at, updated_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether an email address is already taken
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role, active, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
