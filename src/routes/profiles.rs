use axum::{routing::get, Router};

use crate::{handlers::profiles::*, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_my_profile).put(update_profile))
        .route("/:user_id", get(get_profile))
        .route("/:user_id/rating", get(get_rating_summary))
}
