/// Task lifecycle decisions
///
/// Combines the policies, the assignment rules and the status machine into
/// one check per mutation. Each `prepare_*` function takes the actor and the
/// snapshots the caller loaded, and returns either the write to perform plus
/// the activity-log entry to append, or the first rule that failed. Nothing
/// is written here.
///
/// # Create
///
/// 1. `create` policy (staff denied)
/// 2. initial status is not `cancelled`
/// 3. assignee exists
/// 4. a manager may only create tasks for staff
///
/// # Update
///
/// 1. `update` policy
/// 2. if the assignee changes: candidate exists, then it may be assigned
/// 3. if the status changes: the transition is allowed
///
/// # Delete
///
/// `delete` policy only.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::assignment::check_assignment;
use crate::auth::authorization::{authorize, TaskAction};
use crate::error::{DomainError, DomainResult};
use crate::models::activity_log::CreateActivityLog;
use crate::models::task::{check_transition, CreateTask, TaskDetail, TaskStatus, UpdateTask};
use crate::models::user::{Actor, Role, UserSummary};

const ASSIGNEE_NOT_FOUND: &str = "Assigned user not found";

/// Validated fields of a new task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub assigned_to: Uuid,
    pub status: TaskStatus,
    pub due_date: NaiveDate,
}

/// Checks a task creation
///
/// `assignee` is the user loaded for `input.assigned_to`, or `None` when no
/// such user exists.
pub fn prepare_create(
    actor: &Actor,
    assignee: Option<&UserSummary>,
    input: NewTask,
) -> DomainResult<(CreateTask, CreateActivityLog)> {
    authorize(TaskAction::Create, actor, None)?;

    if !input.status.is_valid_initial() {
        return Err(DomainError::validation(
            "status",
            "New tasks must be pending, in_progress or done",
        ));
    }

    let assignee = assignee
        .filter(|user| user.id == input.assigned_to)
        .ok_or_else(|| DomainError::validation("assigned_to", ASSIGNEE_NOT_FOUND))?;

    match actor.role {
        Role::Admin => {}
        Role::Manager => {
            if assignee.role != Role::Staff {
                return Err(DomainError::rule("Managers can only assign tasks to staff"));
            }
        }
        // Unreachable past the create policy, kept exhaustive
        Role::Staff => return Err(DomainError::forbidden("Staff cannot create tasks")),
    }

    let log = CreateActivityLog::task_created(actor.id, &input.title);
    let task = CreateTask {
        title: input.title,
        description: input.description,
        assigned_to: assignee.id,
        created_by: actor.id,
        status: input.status,
        due_date: input.due_date,
    };

    Ok((task, log))
}

/// Checks a task update
///
/// `new_assignee` is the user loaded for `changes.assigned_to` when it is
/// set, or `None` when no such user exists. Fields equal to the current
/// value are dropped from the returned update.
pub fn prepare_update(
    actor: &Actor,
    current: &TaskDetail,
    mut changes: UpdateTask,
    new_assignee: Option<&UserSummary>,
) -> DomainResult<(UpdateTask, CreateActivityLog)> {
    authorize(TaskAction::Update, actor, Some(current))?;

    if changes.assigned_to == Some(current.task.assigned_to) {
        changes.assigned_to = None;
    }

    if let Some(candidate_id) = changes.assigned_to {
        let candidate = new_assignee
            .filter(|user| user.id == candidate_id)
            .map(UserSummary::actor);

        check_assignment(actor, candidate.as_ref()).map_err(|e| match e {
            DomainError::NotFound(_) => DomainError::validation("assigned_to", ASSIGNEE_NOT_FOUND),
            other => other,
        })?;
    }

    if let Some(next) = changes.status {
        check_transition(current.task.status, next)?;
        if next == current.task.status {
            changes.status = None;
        }
    }

    let title = changes.title.as_deref().unwrap_or(&current.task.title);
    let log = CreateActivityLog::task_updated(actor.id, title);

    Ok((changes, log))
}

/// Checks a task deletion
pub fn prepare_delete(actor: &Actor, current: &TaskDetail) -> DomainResult<CreateActivityLog> {
    authorize(TaskAction::Delete, actor, Some(current))?;

    Ok(CreateActivityLog::task_deleted(actor.id, &current.task.title))
}
