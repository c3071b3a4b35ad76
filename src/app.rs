use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/api/visitor-stats", get(handlers::visitor_stats))
        .route("/api/auth-status", get(handlers::auth_status))
        .route("/api/users", get(handlers::list_users))
        .fallback(get(handlers::serve_page))
        // Layered inside-out: the guard runs after the counter, so redirected
        // page hits still count as visits.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::guard_pages,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::track_page_view,
        ))
        .with_state(state)
}
