pub mod dto;
pub mod handlers;
pub mod lifecycle;
pub mod repo;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", post(handlers::create_request).get(handlers::list_requests))
        .route("/requests/:id", get(handlers::get_request))
        .route("/requests/:id/status", put(handlers::update_status))
}
