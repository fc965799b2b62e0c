use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use shared::jwt::JwtConfig;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin, require_user_auth,
    security_headers_middleware, trace_id, RateLimiterState, UserAuth,
};
use crate::routes::{admin, auth, branches, counters, health, queue};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, String> {
    let config = Arc::new(config);
    let jwt = Arc::new(UserAuth::create_jwt_config(&config.jwt)?);

    // Disabled when rate_limit_max_requests is 0
    let rate_limiter = RateLimiterState::new(
        config.security.rate_limit_max_requests,
        config.security.rate_limit_window_secs,
    )
    .map(Arc::new);

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        rate_limiter,
    };

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Customer tablet and login. Rate limited per client IP.
    let public_routes = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/queue/next-number", post(queue::next_number))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Polled read-only views. Not rate limited so display boards keep refreshing.
    let polling_routes = Router::new()
        .route("/api/branches", get(branches::list_branches))
        .route("/api/queue/status/:branch_id", get(queue::branch_status))
        .route("/api/queue/display/:branch_id", get(queue::display));

    // Clerk or admin. Auth runs first (outermost layer = runs first).
    let staff_routes = Router::new()
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/queue/call-next", post(queue::call_next))
        .route("/api/queue/serve", post(queue::serve))
        .route("/api/queue/complete", post(queue::complete))
        .route("/api/queue/history/:user_id", get(queue::history))
        .route("/api/counters", get(counters::list_counters))
        .route("/api/counters/start-session", post(counters::start_session))
        .route("/api/counters/end-session", post(counters::end_session))
        .route("/api/counters/my-session", get(counters::my_session))
        .route("/api/counters/last-used", get(counters::last_used))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/branches",
            get(admin::list_branches).post(admin::create_branch),
        )
        .route("/api/admin/branches/:id/active", put(admin::set_branch_active))
        .route(
            "/api/admin/branches/:id/counters",
            get(admin::list_branch_counters),
        )
        .route("/api/admin/counters", post(admin::create_counter))
        .route("/api/admin/counters/:id/active", put(admin::set_counter_active))
        .route(
            "/api/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/api/admin/users/:id/active", put(admin::set_user_active))
        .route("/api/admin/users/:id/password", put(admin::reset_password))
        .route(
            "/api/admin/users/:id/assignment",
            put(admin::update_assignment),
        )
        .route("/api/admin/tickets/:id", delete(admin::delete_ticket))
        .route("/api/admin/sessions/:id/end", post(admin::force_end_session))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let ops_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let router = Router::new()
        .merge(public_routes)
        .merge(polling_routes)
        .merge(staff_routes)
        .merge(admin_routes)
        .merge(ops_routes)
        .fallback(route_not_found)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state);

    Ok(router)
}
