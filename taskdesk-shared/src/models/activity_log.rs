/// Activity log model and database operations
///
/// The activity log is an append-only audit trail. Entries are written as a
/// side effect of task mutations, user creation and overdue detection, and
/// are never updated or deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE activity_action AS ENUM (
///     'create_task', 'update_task', 'delete_task', 'create_user', 'task_overdue'
/// );
///
/// CREATE TABLE activity_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     action activity_action NOT NULL,
///     description TEXT NOT NULL,
///     logged_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE INDEX idx_activity_logs_logged_at ON activity_logs (logged_at DESC);
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::activity_log::{ActivityLog, CreateActivityLog};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(admin_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// ActivityLog::append(&pool, CreateActivityLog::user_created(admin_id, "new@example.com")).await?;
///
/// let first_page = ActivityLog::list_page(&pool, 1).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::fmt;
use uuid::Uuid;

use super::user::{Role, UserSummary};

/// Entries per page when listing the log
pub const PAGE_SIZE: i64 = 50;

/// Audit action tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateUser,
    TaskOverdue,
}

impl ActivityAction {
    /// Converts action to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::CreateTask => "create_task",
            ActivityAction::UpdateTask => "update_task",
            ActivityAction::DeleteTask => "delete_task",
            ActivityAction::CreateUser => "create_user",
            ActivityAction::TaskOverdue => "task_overdue",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activity log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActivityLog {
    /// Unique entry ID
    pub id: Uuid,

    /// User the entry is attributed to
    pub user_id: Uuid,

    /// Action tag
    pub action: ActivityAction,

    /// Human readable description
    pub description: String,

    /// When the entry was appended
    pub logged_at: DateTime<Utc>,
}

/// Input for appending an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateActivityLog {
    pub user_id: Uuid,
    pub action: ActivityAction,
    pub description: String,
}

impl CreateActivityLog {
    pub fn task_created(actor_id: Uuid, title: &str) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::CreateTask,
            description: format!("Created task: {}", title),
        }
    }

    pub fn task_updated(actor_id: Uuid, title: &str) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::UpdateTask,
            description: format!("Updated task: {}", title),
        }
    }

    pub fn task_deleted(actor_id: Uuid, title: &str) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::DeleteTask,
            description: format!("Deleted task: {}", title),
        }
    }

    pub fn user_created(actor_id: Uuid, email: &str) -> Self {
        Self {
            user_id: actor_id,
            action: ActivityAction::CreateUser,
            description: format!("Created user: {}", email),
        }
    }

    /// Overdue flag, attributed to the task creator
    pub fn task_overdue(creator_id: Uuid, task_id: Uuid) -> Self {
        Self {
            user_id: creator_id,
            action: ActivityAction::TaskOverdue,
            description: format!("Task overdue: {}", task_id),
        }
    }
}

/// Log entry joined with the user it is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    #[serde(flatten)]
    pub log: ActivityLog,

    pub user: UserSummary,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityLogRow {
    id: Uuid,
    user_id: Uuid,
    action: ActivityAction,
    description: String,
    logged_at: DateTime<Utc>,
    user_name: String,
    user_email: String,
    user_role: Role,
}

impl From<ActivityLogRow> for ActivityLogEntry {
    fn from(row: ActivityLogRow) -> Self {
        ActivityLogEntry {
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
                email: row.user_email,
                role: row.user_role,
            },
            log: ActivityLog {
                id: row.id,
                user_id: row.user_id,
                action: row.action,
                description: row.description,
                logged_at: row.logged_at,
            },
        }
    }
}

/// Row offset for a 1-based page number
///
/// Page numbers below 1 are treated as the first page.
pub fn page_offset(page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(PAGE_SIZE)
}

impl ActivityLog {
    /// Appends an entry
    pub async fn append(pool: &PgPool, data: CreateActivityLog) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, action, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, action, description, logged_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Appends an entry inside an open transaction
    pub async fn append_tx(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateActivityLog,
    ) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, ActivityLog>(
            r#"
            INSERT INTO activity_logs (user_id, action, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, action, description, logged_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.action)
        .bind(data.description)
        .fetch_one(&mut **tx)
        .await?;

        Ok(log)
    }

    /// Appends a batch of entries atomically
    pub async fn append_all(
        pool: &PgPool,
        entries: Vec<CreateActivityLog>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut logs = Vec::with_capacity(entries.len());

        for entry in entries {
            logs.push(Self::append_tx(&mut tx, entry).await?);
        }

        tx.commit().await?;

        Ok(logs)
    }

    /// Lists one page of entries, newest first
    pub async fn list_page(pool: &PgPool, page: i64) -> Result<Vec<ActivityLogEntry>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ActivityLogRow>(
            r#"
            SELECT l.id, l.user_id, l.action, l.description, l.logged_at,
                   u.name AS user_name, u.email AS user_email, u.role AS user_role
            FROM activity_logs l
            JOIN users u ON u.id = l.user_id
            ORDER BY l.logged_at DESC, l.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(ActivityLogEntry::from).collect())
    }

    /// Counts entries with a given action
    pub async fn count_by_action(
        pool: &PgPool,
        action: ActivityAction,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM activity_logs WHERE action = $1")
                .bind(action)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Counts all entries
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activity_logs")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
