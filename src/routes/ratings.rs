use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers::ratings::*, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_rating))
        .route("/user/:user_id", get(get_user_ratings))
        .route("/can-rate/:booking_id", get(can_rate))
}
