//! Queuematic HTTP API: queue tickets, counter sessions and status views.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod services;
