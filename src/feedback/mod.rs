pub mod dto;
pub mod handlers;
pub mod repo;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feedback", post(handlers::submit_feedback))
        .route("/feedback/user/:user_id", get(handlers::list_for_user))
}
