/// Database layer for TaskDesk
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Models and their queries live in [`crate::models`].

pub mod migrations;
pub mod pool;
