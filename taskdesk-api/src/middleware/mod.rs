/// Middleware modules for the API server
///
/// - `request_log`: per-request activity events
/// - `security`: response hardening headers
///
/// Authentication lives in [`crate::app`] as a `from_fn_with_state` layer.

pub mod request_log;
pub mod security;
