use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub mod home;

pub fn router(state: Arc<AppState>) -> Router {
    home::router(state)
}
