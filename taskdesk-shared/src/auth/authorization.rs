/// Authorization policies
///
/// Pure decision functions over an explicit [`Actor`] and, where needed, a
/// task snapshot. Nothing here touches the database: handlers load the
/// task first and pass it in.
///
/// # Task policy
///
/// | Action | admin | manager | staff |
/// |---|---|---|---|
/// | `ViewAny` | yes | yes | yes |
/// | `View` | yes | creator, or assignee is staff | assignee or creator |
/// | `Create` | yes | yes | no |
/// | `Update` | yes | creator | assignee |
/// | `Delete` | yes | creator | creator |
/// | `Export` | yes | yes | no |
///
/// # User and log policies
///
/// Listing users is open to admins and managers, creating users and reading
/// the activity log to admins only.
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::authorization::{authorize, TaskAction};
/// use taskdesk_shared::models::user::{Actor, Role};
/// use uuid::Uuid;
///
/// let staff = Actor::new(Uuid::new_v4(), Role::Staff);
/// assert!(authorize(TaskAction::ViewAny, &staff, None).is_ok());
/// assert!(authorize(TaskAction::Create, &staff, None).is_err());
/// ```

use std::fmt;

use super::visibility::is_visible;
use crate::error::{DomainError, DomainResult};
use crate::models::task::TaskDetail;
use crate::models::user::{Actor, Role};

/// Actions on tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    ViewAny,
    View,
    Create,
    Update,
    Delete,
    Export,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskAction::ViewAny => "view_any",
            TaskAction::View => "view",
            TaskAction::Create => "create",
            TaskAction::Update => "update",
            TaskAction::Delete => "delete",
            TaskAction::Export => "export",
        }
    }

    /// Whether the decision depends on a specific task
    pub fn needs_task(&self) -> bool {
        matches!(self, TaskAction::View | TaskAction::Update | TaskAction::Delete)
    }
}

impl fmt::Display for TaskAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions on users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ViewAny,
    Create,
}

pub fn can_view_any(_actor: &Actor) -> bool {
    true
}

pub fn can_view(actor: &Actor, task: &TaskDetail) -> bool {
    is_visible(actor, task)
}

pub fn can_create(actor: &Actor) -> bool {
    match actor.role {
        Role::Admin | Role::Manager => true,
        Role::Staff => false,
    }
}

pub fn can_update(actor: &Actor, task: &TaskDetail) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => task.creator_id() == actor.id,
        Role::Staff => task.assignee_id() == actor.id,
    }
}

pub fn can_delete(actor: &Actor, task: &TaskDetail) -> bool {
    actor.is_admin() || task.creator_id() == actor.id
}

pub fn can_export(actor: &Actor) -> bool {
    match actor.role {
        Role::Admin | Role::Manager => true,
        Role::Staff => false,
    }
}

/// Decides a task action
///
/// Actions that depend on a task fail with `NotFound` when none is given.
pub fn authorize(action: TaskAction, actor: &Actor, task: Option<&TaskDetail>) -> DomainResult<()> {
    let allowed = match (action, task) {
        (TaskAction::ViewAny, _) => can_view_any(actor),
        (TaskAction::Create, _) => can_create(actor),
        (TaskAction::Export, _) => can_export(actor),
        (TaskAction::View, Some(task)) => can_view(actor, task),
        (TaskAction::Update, Some(task)) => can_update(actor, task),
        (TaskAction::Delete, Some(task)) => can_delete(actor, task),
        (TaskAction::View | TaskAction::Update | TaskAction::Delete, None) => {
            return Err(DomainError::not_found("Task"));
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "Not allowed to {} this task",
            action
        )))
    }
}

/// Decides a user action
pub fn authorize_user(action: UserAction, actor: &Actor) -> DomainResult<()> {
    let allowed = match (action, actor.role) {
        (UserAction::ViewAny, Role::Admin | Role::Manager) => true,
        (UserAction::ViewAny, Role::Staff) => false,
        (UserAction::Create, Role::Admin) => true,
        (UserAction::Create, Role::Manager | Role::Staff) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(DomainError::forbidden("Not allowed to manage users"))
    }
}

/// Decides access to the activity log
pub fn authorize_activity_log(actor: &Actor) -> DomainResult<()> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Manager | Role::Staff => Err(DomainError::forbidden(
            "Only admins can read the activity log",
        )),
    }
}
