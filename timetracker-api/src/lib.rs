//! # Timetracker API Server Library
//!
//! HTTP surface of the time tracker: cookie sessions, access rules and the
//! JSON handlers for users, friends, entries, goals, projects and tags.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration loading
//! - `error`: HTTP error responses
//! - `middleware`: Session, access-rule and security-header layers
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
