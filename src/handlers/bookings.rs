use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use chrono::{Duration, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime},
    Collection,
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    handlers::{notifications::push_notification, properties::property_title},
    lifecycle::{transition, BookingEvent},
    models::{
        booking::{
            BookingListQuery, BookingRequest, BookingStatus, CreateBookingRequest,
            DecisionRequest, PaymentStatus, RecordPaymentRequest, RentPaymentRequest,
        },
        profile::{Claims, Profile, UserType},
        property::Property,
    },
    state::AppState,
};

const RENT_CYCLE_DAYS: i64 = 30;

async fn load_booking(state: &AppState, id: &str) -> Result<(ObjectId, BookingRequest)> {
    let collection: Collection<BookingRequest> = state.db.collection("booking_requests");
    let object_id = ObjectId::parse_str(id)?;

    let booking = collection
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::BookingNotFound)?;

    Ok((object_id, booking))
}

/// Student requests a property. The payment window fields are populated
/// here, at insert; owner_id comes from the property record.
pub async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<BookingRequest>> {
    tracing::info!("Booking request from {} for property {}", claims.sub, payload.property_id);

    // Students must have a complete profile before any write happens.
    if claims.user_type == UserType::Student {
        let profiles: Collection<Profile> = state.db.collection("profiles");
        let profile = profiles
            .find_one(doc! { "user_id": &claims.sub })
            .await?
            .ok_or(AppError::ProfileNotFound)?;

        let missing = profile.missing_booking_fields();
        if !missing.is_empty() {
            return Err(AppError::ProfileIncomplete(missing.join(", ")));
        }
    }

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");

    // Pre-check for a friendlier error; the partial unique index still
    // catches the race.
    let existing = bookings
        .find_one(doc! {
            "student_id": &claims.sub,
            "property_id": &payload.property_id,
            "status": BookingStatus::Pending.as_str(),
        })
        .await?;
    if existing.is_some() {
        return Err(AppError::DuplicateBooking);
    }

    let properties: Collection<Property> = state.db.collection("properties");
    let property_oid = ObjectId::parse_str(&payload.property_id)?;
    let property = properties
        .find_one(doc! { "_id": property_oid })
        .await?
        .ok_or(AppError::PropertyNotFound)?;

    if property.owner_id == claims.sub {
        return Err(AppError::invalid_data("You cannot book your own property"));
    }

    let now = Utc::now();
    let expires_at = now + Duration::minutes(state.config.payment_window_minutes);

    let booking = BookingRequest {
        id: Some(ObjectId::new()),
        property_id: payload.property_id.clone(),
        student_id: claims.sub.clone(),
        owner_id: property.owner_id.clone(),
        status: BookingStatus::Pending,
        deposit_amount: property.price * state.config.deposit_rate,
        vodafone_number: state.config.vodafone_cash_number.clone(),
        expires_at: BsonDateTime::from_chrono(expires_at),
        payment_status: PaymentStatus::None,
        payment_option: None,
        payment_proof_url: None,
        rent_due_date: None,
        rent_paid_date: None,
        student_can_rate: false,
        owner_can_rate: false,
        last_rent_reminder_on: None,
        rating_reminder_sent_at: None,
        created_at: BsonDateTime::from_chrono(now),
        updated_at: BsonDateTime::from_chrono(now),
    };

    bookings
        .insert_one(&booking)
        .await
        .map_err(AppError::from_insert)?;

    tracing::info!("Booking created for property {}", payload.property_id);
    Ok(Json(booking))
}

// Caller's bookings, by role, newest first.
pub async fn get_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingRequest>>> {
    let collection: Collection<BookingRequest> = state.db.collection("booking_requests");

    let column = match query.role.as_deref() {
        Some("owner") => "owner_id",
        Some("student") => "student_id",
        Some(other) => return Err(AppError::invalid_data(format!("Unknown role: {}", other))),
        None => match claims.user_type {
            UserType::Owner => "owner_id",
            UserType::Student => "student_id",
        },
    };

    let mut filter = doc! {};
    filter.insert(column, &claims.sub);

    let cursor = collection.find(filter).await?;
    let mut bookings: Vec<BookingRequest> = cursor.try_collect().await?;

    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(bookings))
}

/// Owner accepts or rejects a pending request. The decision goes through the
/// lifecycle transition and the update stays conditioned on `pending`, so a
/// terminal booking cannot be flipped. The student is notified either way.
pub async fn decide_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<DecisionRequest>,
) -> Result<Json<serde_json::Value>> {
    let event = match payload.decision.as_str() {
        "accepted" => BookingEvent::Accept,
        "rejected" => BookingEvent::Reject,
        other => {
            return Err(AppError::invalid_data(format!("Unknown decision: {}", other)));
        }
    };

    let (object_id, booking) = load_booking(&state, &id).await?;

    if booking.owner_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    let new_status = transition(booking.status, event)?;

    if new_status == booking.status {
        // Same decision re-issued, nothing to change.
        return Ok(Json(json!({ "success": true, "status": new_status.as_str() })));
    }

    let mut set = doc! {
        "status": new_status.as_str(),
        "updated_at": BsonDateTime::now(),
    };
    if new_status == BookingStatus::Accepted {
        let due = Utc::now() + Duration::days(RENT_CYCLE_DAYS);
        set.insert("student_can_rate", true);
        set.insert("owner_can_rate", true);
        set.insert("rent_due_date", BsonDateTime::from_chrono(due));
    }

    let collection: Collection<BookingRequest> = state.db.collection("booking_requests");
    let result = collection
        .update_one(
            doc! { "_id": object_id, "status": BookingStatus::Pending.as_str() },
            doc! { "$set": set },
        )
        .await?;

    if result.modified_count == 0 {
        // A sweep or a concurrent decision got there first.
        return Err(AppError::IllegalTransition(
            "booking is no longer pending".to_string(),
        ));
    }

    let title = property_title(&state.db, &booking.property_id).await;
    let (subject, body) = match new_status {
        BookingStatus::Accepted => (
            "Booking Accepted",
            format!(
                "Your booking request for \"{}\" was accepted. Complete your payment to secure it.",
                title
            ),
        ),
        _ => (
            "Booking Rejected",
            format!("Your booking request for \"{}\" was declined.", title),
        ),
    };
    if let Err(e) = push_notification(&state.db, &booking.student_id, subject, &body).await {
        tracing::error!("Failed to notify student for booking {}: {}", id, e);
    }

    tracing::info!("Booking {} moved to {}", id, new_status.as_str());
    Ok(Json(json!({ "success": true, "status": new_status.as_str() })))
}

/// Student records how they paid. Confirmation follows the proof: a proof
/// reference confirms the payment, its absence leaves it unconfirmed. Status
/// is untouched; acceptance stays an owner action.
pub async fn record_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, booking) = load_booking(&state, &id).await?;

    if booking.student_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    let payment_status = if payload.payment_proof_url.is_some() {
        PaymentStatus::Confirmed
    } else {
        PaymentStatus::None
    };

    let collection: Collection<BookingRequest> = state.db.collection("booking_requests");
    collection
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": {
                "payment_option": payload.payment_option.as_str(),
                "payment_proof_url": payload.payment_proof_url.as_deref(),
                "payment_status": payment_status.as_str(),
                "updated_at": BsonDateTime::now(),
            }},
        )
        .await?;

    tracing::info!("Payment recorded for booking {} ({})", id, payment_status.as_str());
    Ok(Json(json!({
        "success": true,
        "payment_status": payment_status.as_str(),
    })))
}

// Marks the current rent cycle paid.
pub async fn record_rent_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<RentPaymentRequest>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, booking) = load_booking(&state, &id).await?;

    if booking.student_id != claims.sub {
        return Err(AppError::Unauthorized);
    }
    if booking.status != BookingStatus::Accepted {
        return Err(AppError::invalid_data("Rent applies to accepted bookings only"));
    }

    let collection: Collection<BookingRequest> = state.db.collection("booking_requests");
    collection
        .update_one(
            doc! { "_id": object_id },
            doc! { "$set": {
                "rent_paid_date": BsonDateTime::from_chrono(payload.paid_date),
                "updated_at": BsonDateTime::now(),
            }},
        )
        .await?;

    Ok(Json(json!({ "success": true })))
}
