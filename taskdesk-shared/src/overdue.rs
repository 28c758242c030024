/// Overdue task detection
///
/// A task is overdue when the start of its due day (UTC) is before `now`
/// and its status is not `done`. Cancelled tasks are flagged as well.
///
/// Each scan appends one `task_overdue` activity entry per overdue task,
/// attributed to the task's creator. Scans do not remember earlier runs:
/// a task that stays overdue is flagged again on every scan. The sweep takes
/// no locks, so a task changed while a scan is running may be flagged or
/// missed depending on timing.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::overdue::run_overdue_scan;
/// use sqlx::PgPool;
/// use chrono::Utc;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let scan = run_overdue_scan(&pool, Utc::now()).await?;
/// println!("flagged {} tasks", scan.flagged_count);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::activity_log::{ActivityLog, CreateActivityLog};
use crate::models::task::Task;

/// Outcome of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueScan {
    /// Number of tasks flagged
    pub flagged_count: usize,

    /// Entries to append, one per flagged task
    pub new_entries: Vec<CreateActivityLog>,
}

/// Flags the overdue tasks in a snapshot
pub fn scan_overdue(now: DateTime<Utc>, tasks: &[Task]) -> OverdueScan {
    let new_entries: Vec<CreateActivityLog> = tasks
        .iter()
        .filter(|task| task.is_overdue(now))
        .map(|task| CreateActivityLog::task_overdue(task.created_by, task.id))
        .collect();

    OverdueScan {
        flagged_count: new_entries.len(),
        new_entries,
    }
}

/// Scans the database and appends the overdue entries
///
/// All entries of one scan are appended in a single transaction.
pub async fn run_overdue_scan(pool: &PgPool, now: DateTime<Utc>) -> Result<OverdueScan, sqlx::Error> {
    let candidates = Task::list_overdue(pool, now).await?;
    let scan = scan_overdue(now, &candidates);

    if scan.flagged_count > 0 {
        ActivityLog::append_all(pool, scan.new_entries.clone()).await?;
    }

    tracing::info!(
        flagged = scan.flagged_count,
        now = %now,
        "Overdue scan complete"
    );

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity_log::ActivityAction;
    use crate::models::task::TaskStatus;
    use chrono::Duration;
    use uuid::Uuid;

    fn task(due_in_days: i64, status: TaskStatus, now: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            title: "Renew licence".to_string(),
            description: String::new(),
            assigned_to: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            status,
            due_date: (now + Duration::days(due_in_days)).date_naive(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_flags_only_past_due_tasks() {
        let now = Utc::now();
        let late = task(-1, TaskStatus::Pending, now);
        let upcoming = task(1, TaskStatus::Pending, now);

        let scan = scan_overdue(now, &[late.clone(), upcoming]);

        assert_eq!(scan.flagged_count, 1);
        assert_eq!(scan.new_entries.len(), 1);

        let entry = &scan.new_entries[0];
        assert_eq!(entry.action, ActivityAction::TaskOverdue);
        assert_eq!(entry.user_id, late.created_by);
        assert!(entry.description.contains(&late.id.to_string()));
    }

    #[test]
    fn test_done_tasks_are_not_flagged() {
        let now = Utc::now();
        let scan = scan_overdue(now, &[task(-3, TaskStatus::Done, now)]);

        assert_eq!(scan.flagged_count, 0);
        assert!(scan.new_entries.is_empty());
    }

    #[test]
    fn test_cancelled_tasks_are_flagged() {
        let now = Utc::now();
        let scan = scan_overdue(now, &[task(-3, TaskStatus::Cancelled, now)]);

        assert_eq!(scan.flagged_count, 1);
    }

    #[test]
    fn test_repeated_scans_flag_again() {
        let now = Utc::now();
        let tasks = vec![task(-1, TaskStatus::InProgress, now)];

        let first = scan_overdue(now, &tasks);
        let second = scan_overdue(now, &tasks);

        // Not deduplicated: the same task yields an entry on every scan
        let mut entries = first.new_entries;
        entries.extend(second.new_entries);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], entries[1]);
    }

    #[test]
    fn test_empty_snapshot() {
        let scan = scan_overdue(Utc::now(), &[]);
        assert_eq!(
            scan,
            OverdueScan {
                flagged_count: 0,
                new_entries: vec![]
            }
        );
    }
}
