/// Task visibility
///
/// Two separate rules decide which tasks an actor sees:
///
/// - the **view predicate** ([`visibility_predicate`]) gates opening a single
///   task: admins see everything, managers see tasks they created or that are
///   assigned to any staff member, staff see tasks assigned to or created by
///   them;
/// - the **list scope** ([`ListScope`]) restricts the task list and the CSV
///   export: admins get every task, everyone else gets tasks assigned to or
///   created by them.
///
/// For managers the two rules differ: a manager can open a task assigned to
/// any staff member even though it does not appear in their list.

use uuid::Uuid;

use crate::models::task::{Task, TaskDetail};
use crate::models::user::{Actor, Role};

/// Returns the per-task view predicate for an actor
pub fn visibility_predicate(actor: Actor) -> impl Fn(&TaskDetail) -> bool {
    move |task: &TaskDetail| is_visible(&actor, task)
}

/// Whether `actor` may open `task`
pub fn is_visible(actor: &Actor, task: &TaskDetail) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => task.creator_id() == actor.id || task.assignee_role() == Role::Staff,
        Role::Staff => task.assignee_id() == actor.id || task.creator_id() == actor.id,
    }
}

/// Keeps only the tasks `actor` may open
pub fn filter_visible(actor: &Actor, tasks: Vec<TaskDetail>) -> Vec<TaskDetail> {
    let visible = visibility_predicate(*actor);
    tasks.into_iter().filter(|task| visible(task)).collect()
}

/// Rows an actor's task list is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// Every task
    All,

    /// Tasks assigned to or created by this user
    Involving(Uuid),
}

impl ListScope {
    /// Listing scope for an actor
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role {
            Role::Admin => ListScope::All,
            Role::Manager | Role::Staff => ListScope::Involving(actor.id),
        }
    }

    /// Whether a task falls inside the scope
    pub fn contains(&self, task: &Task) -> bool {
        match self {
            ListScope::All => true,
            ListScope::Involving(user_id) => {
                task.assigned_to == *user_id || task.created_by == *user_id
            }
        }
    }
}
