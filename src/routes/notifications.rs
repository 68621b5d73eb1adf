use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::{handlers::notifications::*, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_notifications))
        .route("/read-all", put(mark_all_read))
        .route("/:id/read", put(mark_notification_read))
        .route("/:id", delete(delete_notification))
}
