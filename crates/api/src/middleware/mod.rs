//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
pub mod trace_id;
pub mod user_auth;

pub use logging::init_logging;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::{rate_limit_middleware, RateLimiterState};
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
pub use user_auth::{require_admin, require_user_auth, UserAuth};
