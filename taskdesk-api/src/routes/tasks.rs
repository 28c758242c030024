/// Task endpoints
///
/// - `GET /api/tasks` - List tasks in the caller's scope
/// - `GET /api/tasks/export` - Download the same list as CSV
/// - `GET /api/tasks/:id` - Show a task
/// - `POST /api/tasks` - Create a task
/// - `PUT /api/tasks/:id` - Update a task
/// - `DELETE /api/tasks/:id` - Delete a task
///
/// Handlers load what the rules need, hand it to the shared rule engine
/// (`authorize`, `lifecycle::prepare_*`) and persist the outcome together
/// with its activity log entry in one transaction.
///
/// Check order for create: policy (403), fields (422), assignee exists
/// (422), manager assigns staff only (422). For update: task exists (404),
/// policy (403), fields (422), assignee exists (422) and may be assigned
/// by the caller (403), status transition (422).

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    export,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::PgPool;
use taskdesk_shared::{
    auth::{
        authorization::{authorize, TaskAction},
        middleware::AuthContext,
        visibility::ListScope,
    },
    lifecycle::{prepare_create, prepare_delete, prepare_update, NewTask},
    models::{
        activity_log::ActivityLog,
        task::{Task, TaskDetail, TaskStatus, UpdateTask},
        user::{User, UserSummary},
    },
};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Create task request
///
/// Values arrive as strings and are parsed in [`CreateTaskRequest::parse`]
/// so every bad field is reported at once.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub assigned_to: String,

    /// Defaults to `pending`
    pub status: Option<String>,

    #[serde(default)]
    pub due_date: String,
}

/// Update task request; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Collects field errors while parsing a request
#[derive(Default)]
struct FieldErrors(Vec<ValidationErrorDetail>);

impl FieldErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(ValidationErrorDetail {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, format!("The {} field is required.", field));
        }
    }

    fn uuid(&mut self, field: &str, value: &str) -> Option<Uuid> {
        match Uuid::parse_str(value.trim()) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, format!("The {} must be a valid UUID.", field));
                None
            }
        }
    }

    fn status(&mut self, value: &str) -> Option<TaskStatus> {
        match value.parse::<TaskStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                self.push("status", "The selected status is invalid.");
                None
            }
        }
    }

    fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                self.push(field, format!("The {} must be a date in YYYY-MM-DD format.", field));
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> ApiResult<T> {
        match value {
            Some(value) if self.0.is_empty() => Ok(value),
            _ => Err(ApiError::ValidationError(self.0)),
        }
    }
}

impl CreateTaskRequest {
    fn parse(&self) -> ApiResult<NewTask> {
        let mut errors = FieldErrors::default();

        errors.required("title", &self.title);
        errors.required("description", &self.description);
        let assigned_to = errors.uuid("assigned_to", &self.assigned_to);
        let status = match self.status.as_deref() {
            Some(value) => errors.status(value),
            None => Some(TaskStatus::Pending),
        };
        let due_date = errors.date("due_date", &self.due_date);

        let task = match (assigned_to, status, due_date) {
            (Some(assigned_to), Some(status), Some(due_date)) => Some(NewTask {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                assigned_to,
                status,
                due_date,
            }),
            _ => None,
        };

        errors.finish(task)
    }
}

impl UpdateTaskRequest {
    fn parse(&self) -> ApiResult<UpdateTask> {
        let mut errors = FieldErrors::default();

        if let Some(title) = &self.title {
            errors.required("title", title);
        }
        if let Some(description) = &self.description {
            errors.required("description", description);
        }
        let assigned_to = self.assigned_to.as_deref().map(|v| errors.uuid("assigned_to", v));
        let status = self.status.as_deref().map(|v| errors.status(v));
        let due_date = self.due_date.as_deref().map(|v| errors.date("due_date", v));

        let changes = UpdateTask {
            title: self.title.as_deref().map(|v| v.trim().to_string()),
            description: self.description.as_deref().map(|v| v.trim().to_string()),
            assigned_to: assigned_to.flatten(),
            status: status.flatten(),
            due_date: due_date.flatten(),
        };

        errors.finish(Some(changes))
    }
}

async fn load_detail(pool: &PgPool, id: Uuid) -> ApiResult<TaskDetail> {
    Task::find_detail(pool, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

async fn load_summary(pool: &PgPool, id: Uuid) -> ApiResult<Option<UserSummary>> {
    Ok(User::find_by_id(pool, id).await?.map(|user| user.summary()))
}

/// Lists tasks: all for admins, created-by or assigned-to the caller otherwise
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Value>> {
    authorize(TaskAction::ViewAny, &auth.actor, None)?;

    let tasks = Task::list_for_scope(&state.db, &ListScope::for_actor(&auth.actor)).await?;

    Ok(Json(json!({ "data": tasks })))
}

/// Shows a single task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskDetail>> {
    let detail = load_detail(&state.db, id).await?;
    authorize(TaskAction::View, &auth.actor, Some(&detail))?;

    Ok(Json(detail))
}

/// Creates a task
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskDetail>)> {
    authorize(TaskAction::Create, &auth.actor, None)?;

    let Json(req) = payload?;
    let input = req.parse()?;

    let assignee = load_summary(&state.db, input.assigned_to).await?;
    let (new_task, log) = prepare_create(&auth.actor, assignee.as_ref(), input)?;

    let mut tx = state.db.begin().await?;
    let task = Task::create_tx(&mut tx, new_task).await?;
    ActivityLog::append_tx(&mut tx, log).await?;
    tx.commit().await?;

    tracing::info!(
        task_id = %task.id,
        created_by = %auth.user_id(),
        assigned_to = %task.assigned_to,
        "Task created"
    );

    let detail = load_detail(&state.db, task.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Updates a task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskDetail>> {
    let current = load_detail(&state.db, id).await?;
    authorize(TaskAction::Update, &auth.actor, Some(&current))?;

    let Json(req) = payload?;
    let changes = req.parse()?;

    let new_assignee = match changes.assigned_to {
        Some(candidate) if candidate != current.task.assigned_to => {
            load_summary(&state.db, candidate).await?
        }
        _ => None,
    };

    let (changes, log) = prepare_update(&auth.actor, &current, changes, new_assignee.as_ref())?;

    let mut tx = state.db.begin().await?;
    if !changes.is_empty() {
        Task::update_tx(&mut tx, id, changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;
    }
    ActivityLog::append_tx(&mut tx, log).await?;
    tx.commit().await?;

    tracing::info!(task_id = %id, updated_by = %auth.user_id(), "Task updated");

    Ok(Json(load_detail(&state.db, id).await?))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let current = load_detail(&state.db, id).await?;
    let log = prepare_delete(&auth.actor, &current)?;

    let mut tx = state.db.begin().await?;
    if !Task::delete_tx(&mut tx, id).await? {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }
    ActivityLog::append_tx(&mut tx, log).await?;
    tx.commit().await?;

    tracing::info!(task_id = %id, deleted_by = %auth.user_id(), "Task deleted");

    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

/// Exports the caller's task list as CSV
pub async fn export_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    authorize(TaskAction::Export, &auth.actor, None)?;

    let tasks = Task::list_for_scope(&state.db, &ListScope::for_actor(&auth.actor)).await?;
    let body = export::render_tasks(&tasks);
    let disposition = format!(
        "attachment; filename=\"{}\"",
        export::filename(Utc::now())
    );

    tracing::info!(user_id = %auth.user_id(), rows = tasks.len(), "Tasks exported");

    Ok((
        [
            (header::CONTENT_TYPE, export::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}
