/// Overdue scheduler
///
/// Runs the overdue sweep on a fixed interval until shut down. Each tick:
///
/// ```text
/// OverdueScheduler
///   ├─> run_overdue_scan: flag overdue tasks in the activity log
///   └─> RevokedToken::purge_expired: drop logout records past expiry
/// ```
///
/// The first tick runs immediately. A failed tick is logged and the loop
/// carries on; the next tick retries from scratch.
///
/// Sweeps are not idempotent: a task that stays overdue is flagged again on
/// every tick.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sqlx::PgPool;
/// use taskdesk_worker::scheduler::OverdueScheduler;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let scheduler = OverdueScheduler::new(pool, Duration::from_secs(3600));
/// let token = scheduler.shutdown_token();
///
/// tokio::spawn(async move {
///     let _ = tokio::signal::ctrl_c().await;
///     token.cancel();
/// });
///
/// scheduler.run().await;
/// # Ok(())
/// # }
/// ```

use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use taskdesk_shared::models::revoked_token::RevokedToken;
use taskdesk_shared::overdue::run_overdue_scan;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Outcome of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Tasks flagged overdue
    pub flagged: usize,

    /// Expired revoked tokens removed
    pub purged_tokens: u64,
}

pub struct OverdueScheduler {
    db: PgPool,
    scan_interval: Duration,
    shutdown_token: CancellationToken,
}

impl OverdueScheduler {
    pub fn new(db: PgPool, scan_interval: Duration) -> Self {
        Self {
            db,
            scan_interval,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs a single sweep
    pub async fn tick(&self) -> Result<TickReport, sqlx::Error> {
        let now = Utc::now();

        let scan = run_overdue_scan(&self.db, now).await?;
        let purged_tokens = RevokedToken::purge_expired(&self.db, now).await?;

        Ok(TickReport {
            flagged: scan.flagged_count,
            purged_tokens,
        })
    }

    /// Ticks until shutdown, returning the number of completed ticks
    pub async fn run(&self) -> u64 {
        tracing::info!(
            interval_secs = self.scan_interval.as_secs(),
            "Overdue scheduler starting"
        );

        let mut ticker = interval(self.scan_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed = 0;

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.tick().await {
                Ok(report) => {
                    completed += 1;
                    tracing::info!(
                        flagged = report.flagged,
                        purged_tokens = report.purged_tokens,
                        "Scheduler tick complete"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduler tick failed");
                }
            }
        }

        tracing::info!(ticks = completed, "Overdue scheduler shut down");
        completed
    }
}
