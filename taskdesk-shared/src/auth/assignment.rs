/// Assignment rules
///
/// Decides whether an actor may hand a task to a candidate assignee. Rules
/// are checked per role, in this order:
///
/// 1. admin: anyone
/// 2. manager: any staff member, or themselves
/// 3. staff: only themselves
///
/// A candidate that does not exist is reported as [`DomainError::NotFound`],
/// never as a denial, so callers can tell "no such user" from "not allowed".

use crate::error::{DomainError, DomainResult};
use crate::models::user::{Actor, Role};

/// Whether `actor` may assign a task to `candidate`
pub fn can_assign(actor: &Actor, candidate: &Actor) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Manager => candidate.role == Role::Staff || candidate.id == actor.id,
        Role::Staff => candidate.id == actor.id,
    }
}

/// Checks an assignment, distinguishing a missing candidate from a denial
pub fn check_assignment(actor: &Actor, candidate: Option<&Actor>) -> DomainResult<()> {
    let candidate = candidate.ok_or_else(|| DomainError::not_found("Assigned user"))?;

    if can_assign(actor, candidate) {
        Ok(())
    } else {
        Err(DomainError::forbidden(format!(
            "A {} cannot assign tasks to this user",
            actor.role
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn actor(role: Role) -> Actor {
        Actor::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_admin_can_assign_anyone() {
        let admin = actor(Role::Admin);
        for role in Role::ALL {
            assert!(can_assign(&admin, &actor(role)));
        }
        assert!(can_assign(&admin, &admin));
    }

    #[test]
    fn test_manager_assigns_staff_or_self_only() {
        let manager = actor(Role::Manager);

        for role in Role::ALL {
            let candidate = actor(role);
            assert_eq!(can_assign(&manager, &candidate), role == Role::Staff);
        }

        assert!(can_assign(&manager, &manager));
    }

    #[test]
    fn test_staff_assigns_only_self() {
        let staff = actor(Role::Staff);

        assert!(can_assign(&staff, &staff));
        assert!(!can_assign(&staff, &actor(Role::Staff)));
        assert!(!can_assign(&staff, &actor(Role::Manager)));
        assert!(!can_assign(&staff, &actor(Role::Admin)));
    }

    #[test]
    fn test_missing_candidate_is_not_found() {
        let admin = actor(Role::Admin);
        assert_eq!(
            check_assignment(&admin, None),
            Err(DomainError::not_found("Assigned user"))
        );
    }

    #[test]
    fn test_denied_assignment_is_forbidden() {
        let manager = actor(Role::Manager);
        let other_manager = actor(Role::Manager);

        let err = check_assignment(&manager, Some(&other_manager)).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        assert!(check_assignment(&manager, Some(&actor(Role::Staff))).is_ok());
    }
}
