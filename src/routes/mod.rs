// src/routes/mod.rs
pub mod chat;
pub mod page;

use crate::{error::AppError, state::SharedState};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use chat::{get_metrics_handler, index_handler, reset_handler, session_middleware, submit_handler};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: SharedState) -> Router {
    let admin_routes = Router::new()
        .route("/metrics", get(get_metrics_handler))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let session_routes = Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/reset", post(reset_handler))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware));

    Router::new()
        .merge(session_routes)
        .nest("/admin", admin_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn auth_middleware(
    State(state): State<SharedState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get("x-admin-key")
        .and_then(|v| v.to_str().ok());

    // No configured key means the admin surface stays closed.
    let authorized = matches!(
        (state.admin_key.as_deref(), provided),
        (Some(expected), Some(given)) if expected == given
    );

    if authorized {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized)
    }
}
