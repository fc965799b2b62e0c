//! Request extractors.

pub mod json;
pub mod user_auth;

pub use json::ValidatedJson;
pub use user_auth::UserAuth;
