//! # TaskDesk API Server Library
//!
//! HTTP surface of TaskDesk: authentication, users, tasks, CSV export and
//! the activity log. Business rules live in `taskdesk-shared`; this crate
//! loads data, calls the rules and maps outcomes to HTTP.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `bootstrap`: first admin account
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `export`: CSV rendering
//! - `middleware`: request logging and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod export;
pub mod middleware;
pub mod routes;
