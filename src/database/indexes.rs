use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

use crate::models::booking::BookingRequest;

/// At most one pending booking per (student, property). The partial filter
/// keeps accepted/rejected/expired rows out of the constraint so a student
/// can re-request after an expiry.
pub async fn ensure_indexes(db: &Database) {
    let bookings = db.collection::<BookingRequest>("booking_requests");

    let options = IndexOptions::builder()
        .unique(true)
        .partial_filter_expression(doc! { "status": "pending" })
        .build();

    let index = IndexModel::builder()
        .keys(doc! { "student_id": 1, "property_id": 1 })
        .options(options)
        .build();

    match bookings.create_index(index).await {
        Ok(result) => tracing::info!("Booking index ready: {}", result.index_name),
        Err(e) => tracing::error!("Failed to create booking index: {}", e),
    }
}
