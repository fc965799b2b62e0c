//! HTTP route handlers.

pub mod admin;
pub mod auth;
pub mod branches;
pub mod counters;
pub mod health;
pub mod queue;
