//! # TaskDesk Shared Library
//!
//! This crate contains the domain model and the rules engine shared by the
//! TaskDesk API server and the overdue-scan worker.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures (users, tasks, activity logs)
//! - `auth`: Authentication, authorization policies, assignment and visibility rules
//! - `lifecycle`: Create/update/delete checks combining policies, assignment and status rules
//! - `overdue`: Overdue task detection
//! - `db`: Connection pool and migrations
//! - `error`: Domain error kinds

pub mod auth;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod overdue;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
