use axum::{
    routing::{get, put},
    Router,
};

use crate::{handlers::bookings::*, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_bookings).post(create_booking))
        .route("/:id/decision", put(decide_booking))
        .route("/:id/payment", put(record_payment))
        .route("/:id/rent-payment", put(record_rent_payment))
}
