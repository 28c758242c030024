//! # TaskDesk Worker Library
//!
//! Background jobs for TaskDesk. The worker shares the API's database and
//! runs the overdue sweep on a schedule.
//!
//! ## Modules
//!
//! - `config`: `WORKER_` environment configuration
//! - `scheduler`: interval loop around the overdue sweep

pub mod config;
pub mod scheduler;
