use std::sync::Arc;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::{
    middleware::{catch_panic_layer, json_error_middleware},
    state::AppState,
};

use super::{items, views};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(items::router(state.clone()))
        .merge(views::router(state))
}

/// The full service: routes plus error rewriting, panic capture and tracing.
pub fn build_app(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(TraceLayer::new_for_http())
}
