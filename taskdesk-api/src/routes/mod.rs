/// API route handlers, organized by resource
///
/// - `health`: health check
/// - `auth`: login and logout
/// - `users`: user listing and creation
/// - `tasks`: task CRUD and CSV export
/// - `logs`: activity log

pub mod auth;
pub mod health;
pub mod logs;
pub mod tasks;
pub mod users;
