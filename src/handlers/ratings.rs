use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    Collection,
};
use serde_json::json;
use validator::Validate;

use crate::{
    errors::{AppError, Result},
    models::{
        booking::BookingRequest,
        profile::Claims,
        rating::{CreateRatingRequest, Rating},
    },
    state::AppState,
};

/// Submits a rating for the counterparty of a booking. Eligibility is the
/// per-side can_rate flag on the booking, cleared once the rating lands so
/// each side rates at most once.
pub async fn create_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRatingRequest>,
) -> Result<Json<Rating>> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");
    let booking_oid = ObjectId::parse_str(&payload.booking_id)?;

    let booking = bookings
        .find_one(doc! { "_id": booking_oid })
        .await?
        .ok_or(AppError::BookingNotFound)?;

    let (to_user, flag_field, eligible) = if claims.sub == booking.student_id {
        (booking.owner_id.clone(), "student_can_rate", booking.student_can_rate)
    } else if claims.sub == booking.owner_id {
        (booking.student_id.clone(), "owner_can_rate", booking.owner_can_rate)
    } else {
        return Err(AppError::Unauthorized);
    };

    if !eligible {
        return Err(AppError::invalid_data(
            "Rating is not permitted for this booking",
        ));
    }

    let rating = Rating {
        id: Some(ObjectId::new()),
        from_user: claims.sub.clone(),
        to_user,
        booking_id: payload.booking_id.clone(),
        stars: payload.stars,
        comment: payload.comment,
        created_at: BsonDateTime::now(),
    };

    let ratings: Collection<Rating> = state.db.collection("ratings");
    ratings.insert_one(&rating).await?;

    bookings
        .update_one(
            doc! { "_id": booking_oid },
            doc! { "$set": { flag_field: false, "updated_at": BsonDateTime::now() } },
        )
        .await?;

    tracing::info!("Rating submitted for booking {}", payload.booking_id);
    Ok(Json(rating))
}

// Ratings received by a user, newest first.
pub async fn get_user_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Rating>>> {
    let collection: Collection<Rating> = state.db.collection("ratings");

    let cursor = collection.find(doc! { "to_user": &user_id }).await?;
    let mut ratings: Vec<Rating> = cursor.try_collect().await?;

    ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(ratings))
}

// Whether the caller may still rate the counterparty of this booking.
pub async fn can_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");
    let booking_oid = ObjectId::parse_str(&booking_id)?;

    let booking = bookings
        .find_one(doc! { "_id": booking_oid })
        .await?
        .ok_or(AppError::BookingNotFound)?;

    let allowed = if claims.sub == booking.student_id {
        booking.student_can_rate
    } else if claims.sub == booking.owner_id {
        booking.owner_can_rate
    } else {
        return Err(AppError::Unauthorized);
    };

    Ok(Json(json!({ "booking_id": booking_id, "can_rate": allowed })))
}
