//! Shared utilities for the Queuematic backend.
//!
//! - JWT issuance and validation for staff tokens
//! - Password hashing with Argon2id
//! - Validation helpers used by request DTOs

pub mod jwt;
pub mod password;
pub mod validation;
