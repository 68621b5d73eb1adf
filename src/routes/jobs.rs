use axum::{routing::post, Router};

use crate::{handlers::jobs::*, state::AppState};

// Invoked by the external scheduler; guarded by the job token middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expire-bookings", post(expire_payment_window))
        .route("/cleanup-expired-bookings", post(cleanup_stale_bookings))
        .route("/rent-reminder", post(rent_reminders))
        .route("/rating-reminders", post(rating_reminders))
}
