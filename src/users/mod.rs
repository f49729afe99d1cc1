pub mod dto;
pub mod handlers;
pub mod repo;
pub mod search;
pub mod skills;

use axum::routing::{get, put};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::search_users))
        .route("/users/profile", put(handlers::update_profile))
        .route("/users/profile/me", get(handlers::get_me))
        .route("/users/:username", get(handlers::get_by_username))
}
