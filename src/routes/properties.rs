use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::properties::*, state::AppState};

// Browsing is open; listing management requires auth.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_properties))
        .route("/:id", get(get_property))
}

pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_property))
        .route("/mine", get(get_owner_properties))
        .route("/:id", axum::routing::put(update_property).delete(delete_property))
}
