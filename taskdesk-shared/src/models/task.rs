/// Task model, status machine and database operations
///
/// # State Machine
///
/// ```text
/// pending ──→ in_progress ──→ done
///    │             │            │
///    └─────────────┴────────────┴──→ cancelled
/// ```
///
/// `cancelled` is absorbing. `done` has exactly one way out, to `cancelled`.
/// The machine is only consulted when an existing task changes status; the
/// status a task is created with is supplied by the caller.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'done', 'cancelled');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     assigned_to UUID NOT NULL REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     status task_status NOT NULL DEFAULT 'pending',
///     due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{CreateTask, Task, TaskStatus};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
/// use chrono::NaiveDate;
/// use uuid::Uuid;
///
/// # async fn example(admin_id: Uuid, staff_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = Task::create(&pool, CreateTask {
///     title: "Quarterly report".to_string(),
///     description: "Collect numbers".to_string(),
///     assigned_to: staff_id,
///     created_by: admin_id,
///     status: TaskStatus::Pending,
///     due_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::user::{Role, UserSummary};
use crate::auth::visibility::ListScope;
use crate::error::DomainError;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet (initial state)
    Pending,

    /// Being worked on
    InProgress,

    /// Completed
    Done,

    /// Abandoned (absorbing)
    Cancelled,
}

impl TaskStatus {
    /// All statuses, in declaration order
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Cancelled,
    ];

    /// Converts status to its wire/database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step from this one
    pub fn allowed_next(&self) -> &'static [TaskStatus] {
        match self {
            TaskStatus::Pending => &[TaskStatus::InProgress, TaskStatus::Cancelled],
            TaskStatus::InProgress => &[TaskStatus::Done, TaskStatus::Cancelled],
            TaskStatus::Done => &[TaskStatus::Cancelled],
            TaskStatus::Cancelled => &[],
        }
    }

    /// Checks if transition to target status is valid
    pub fn can_transition_to(&self, target: TaskStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    /// Checks if the status has no outgoing transitions
    pub fn is_absorbing(&self) -> bool {
        self.allowed_next().is_empty()
    }

    /// Whether a task may be created with this status
    ///
    /// New tasks may start anywhere except `cancelled`.
    pub fn is_valid_initial(&self) -> bool {
        !matches!(self, TaskStatus::Cancelled)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            "cancelled" => Ok(TaskStatus::Cancelled),
            other => Err(DomainError::validation(
                "status",
                format!("'{}' is not a known task status", other),
            )),
        }
    }
}

/// Checks a status change given raw status strings
///
/// Fails closed: an unknown `current` or `next` is never a valid transition.
pub fn is_valid_transition(current: &str, next: &str) -> bool {
    match (current.parse::<TaskStatus>(), next.parse::<TaskStatus>()) {
        (Ok(current), Ok(next)) => current.can_transition_to(next),
        _ => false,
    }
}

/// Validates a status change on an existing task
///
/// Keeping the same status is not a transition and always passes.
pub fn check_transition(current: TaskStatus, next: TaskStatus) -> Result<(), DomainError> {
    if current == next || current.can_transition_to(next) {
        return Ok(());
    }

    Err(DomainError::rule(format!(
        "Cannot change task status from {} to {}",
        current, next
    )))
}

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title
    pub title: String,

    /// Free-form description
    pub description: String,

    /// Assignee user ID
    pub assigned_to: Uuid,

    /// Creator user ID
    pub created_by: Uuid,

    /// Current status
    pub status: TaskStatus,

    /// Due date (calendar day)
    pub due_date: NaiveDate,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Start of the due day, UTC
    pub fn due_at(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.due_date.and_time(NaiveTime::MIN))
    }

    /// Whether the task is overdue at `now`
    ///
    /// A task is overdue once the start of its due day has passed and it is
    /// not done. Cancelled tasks count as overdue.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_at() < now && self.status != TaskStatus::Done
    }
}

/// Task joined with the assignee and creator summaries
///
/// This is the snapshot the visibility filter and the authorization policy
/// evaluate, and the shape returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,

    /// User the task is assigned to
    pub assigned_user: UserSummary,

    /// User who created the task
    pub creator: UserSummary,
}

impl TaskDetail {
    /// Assignee user ID
    pub fn assignee_id(&self) -> Uuid {
        self.task.assigned_to
    }

    /// Creator user ID
    pub fn creator_id(&self) -> Uuid {
        self.task.created_by
    }

    /// Assignee role
    pub fn assignee_role(&self) -> Role {
        self.assigned_user.role
    }
}

/// Flat row produced by the task/users join
#[derive(Debug, sqlx::FromRow)]
struct TaskDetailRow {
    id: Uuid,
    title: String,
    description: String,
    assigned_to: Uuid,
    created_by: Uuid,
    status: TaskStatus,
    due_date: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    assignee_name: String,
    assignee_email: String,
    assignee_role: Role,
    creator_name: String,
    creator_email: String,
    creator_role: Role,
}

impl From<TaskDetailRow> for TaskDetail {
    fn from(row: TaskDetailRow) -> Self {
        TaskDetail {
            assigned_user: UserSummary {
                id: row.assigned_to,
                name: row.assignee_name,
                email: row.assignee_email,
                role: row.assignee_role,
            },
            creator: UserSummary {
                id: row.created_by,
                name: row.creator_name,
                email: row.creator_email,
                role: row.creator_role,
            },
            task: Task {
                id: row.id,
                title: row.title,
                description: row.description,
                assigned_to: row.assigned_to,
                created_by: row.created_by,
                status: row.status,
                due_date: row.due_date,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, assigned_to, created_by, status, due_date, created_at, updated_at";

const DETAIL_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.assigned_to, t.created_by, t.status,
           t.due_date, t.created_at, t.updated_at,
           a.name AS assignee_name, a.email AS assignee_email, a.role AS assignee_role,
           c.name AS creator_name, c.email AS creator_email, c.role AS creator_role
    FROM tasks t
    JOIN users a ON a.id = t.assigned_to
    JOIN users c ON c.id = t.created_by
"#;

/// Input for creating a new task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
}

/// Input for updating a task
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl UpdateTask {
    /// Whether the update carries no changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.assigned_to.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let task = Self::create_tx(&mut tx, data).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Creates a new task inside an open transaction
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        data: CreateTask,
    ) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, description, assigned_to, created_by, status, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.assigned_to)
        .bind(data.created_by)
        .bind(data.status)
        .bind(data.due_date)
        .fetch_one(&mut **tx)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID together with its assignee and creator
    pub async fn find_detail(pool: &PgPool, id: Uuid) -> Result<Option<TaskDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, TaskDetailRow>(&format!("{} WHERE t.id = $1", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskDetail::from))
    }

    /// Lists tasks within a listing scope, oldest first
    pub async fn list_for_scope(
        pool: &PgPool,
        scope: &ListScope,
    ) -> Result<Vec<TaskDetail>, sqlx::Error> {
        let rows = match scope {
            ListScope::All => {
                sqlx::query_as::<_, TaskDetailRow>(&format!(
                    "{} ORDER BY t.created_at ASC",
                    DETAIL_SELECT
                ))
                .fetch_all(pool)
                .await?
            }
            ListScope::Involving(user_id) => {
                sqlx::query_as::<_, TaskDetailRow>(&format!(
                    "{} WHERE t.assigned_to = $1 OR t.created_by = $1 ORDER BY t.created_at ASC",
                    DETAIL_SELECT
                ))
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(TaskDetail::from).collect())
    }

    /// Updates a task
    ///
    /// Only non-None fields in `data` are written. Returns None if the task
    /// doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let task = Self::update_tx(&mut tx, id, data).await?;
        tx.commit().await?;

        Ok(task)
    }

    /// Updates a task inside an open transaction
    pub async fn update_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.assigned_to.is_some() {
            bind_count += 1;
            query.push_str(&format!(", assigned_to = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", TASK_COLUMNS));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(assigned_to) = data.assigned_to {
            q = q.bind(assigned_to);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(&mut **tx).await?;

        Ok(task)
    }

    /// Deletes a task (hard delete)
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted = Self::delete_tx(&mut tx, id).await?;
        tx.commit().await?;

        Ok(deleted)
    }

    /// Deletes a task inside an open transaction
    pub async fn delete_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks that are overdue at `now`
    ///
    /// Same rule as [`Task::is_overdue`], evaluated in SQL.
    pub async fn list_overdue(pool: &PgPool, now: DateTime<Utc>) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {}
            FROM tasks
            WHERE (due_date::timestamp AT TIME ZONE 'UTC') < $1
              AND status <> 'done'
            ORDER BY due_date ASC, created_at ASC
            "#,
            TASK_COLUMNS
        ))
        .bind(now)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
