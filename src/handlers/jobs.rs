//! Scheduled sweep jobs. Each is an HTTP-callable, stateless pass over the
//! booking_requests collection: the two expiry sweeps condition every update
//! on the same predicate they selected with, so a re-run or a concurrent run
//! double-processing a row is a no-op; the reminder sweeps stamp a
//! de-duplication marker before they would re-notify.

use axum::{extract::State, response::Json};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime, Document},
    Collection,
};
use serde_json::json;

use crate::{
    errors::Result,
    handlers::{notifications::push_notification, properties::property_title},
    models::{
        booking::{BookingRequest, BookingStatus, PaymentStatus},
        rating::Rating,
    },
    state::AppState,
};

/// Calendar-day delta between the due date and today, both at midnight.
fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due.date_naive() - now.date_naive()).num_days()
}

fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn month_start(year: i32, month: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
}

/// Half-open [start of previous month, start of current month).
fn previous_month_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (prev_year, prev_month) = if now.month() == 1 {
        (now.year() - 1, 12)
    } else {
        (now.year(), now.month() - 1)
    };
    (
        month_start(prev_year, prev_month),
        month_start(now.year(), now.month()),
    )
}

#[derive(Debug, PartialEq, Eq)]
enum RentReminder {
    Upcoming,
    DueToday,
    DueTomorrow,
    Overdue(i64),
    Quiet,
}

fn classify_rent_due(days_remaining: i64) -> RentReminder {
    match days_remaining {
        5 => RentReminder::Upcoming,
        0 => RentReminder::DueToday,
        1 => RentReminder::DueTomorrow,
        d if d < 0 => RentReminder::Overdue(-d),
        _ => RentReminder::Quiet,
    }
}

// Each sweep selects and updates with the same predicate, built once here,
// so a row that left `pending` between select and update is never touched.

fn payment_window_filter(now: BsonDateTime) -> Document {
    doc! {
        "status": BookingStatus::Pending.as_str(),
        "payment_status": PaymentStatus::None.as_str(),
        "expires_at": { "$lt": now },
    }
}

fn stale_booking_filter(cutoff: BsonDateTime) -> Document {
    doc! {
        "status": BookingStatus::Pending.as_str(),
        "created_at": { "$lt": cutoff },
    }
}

fn unpaid_rent_filter() -> Document {
    doc! {
        "status": BookingStatus::Accepted.as_str(),
        "rent_due_date": { "$ne": null },
        "rent_paid_date": null,
    }
}

fn last_month_filter(start: BsonDateTime, end: BsonDateTime) -> Document {
    doc! {
        "status": BookingStatus::Accepted.as_str(),
        "created_at": { "$gte": start, "$lt": end },
    }
}

/// A booking's reminder marker is stamped only once every planned insert
/// landed; a partial failure leaves the row eligible for the next run.
fn stamp_after(sent: usize, planned: usize) -> bool {
    planned > 0 && sent == planned
}

/// Payment-window sweep: pending bookings whose `expires_at` passed without
/// a confirmed payment move to expired. No notifications from this variant;
/// the fast timeout is communicated by the UI countdown.
pub async fn expire_payment_window(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!("Starting payment-window expiry sweep");

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");
    let now = BsonDateTime::now();

    let result = bookings
        .update_many(
            payment_window_filter(now),
            doc! { "$set": {
                "status": BookingStatus::Expired.as_str(),
                "updated_at": now,
            }},
        )
        .await?;

    tracing::info!("Expired {} bookings past their payment window", result.modified_count);
    Ok(Json(json!({
        "success": true,
        "expiredCount": result.modified_count,
    })))
}

/// Age-based sweep: long-tail garbage collection for pending requests that
/// outlived the retention window regardless of their payment fields. Each
/// affected student gets one notification.
pub async fn cleanup_stale_bookings(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>> {
    tracing::info!("Starting cleanup of stale bookings");

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");
    let cutoff =
        BsonDateTime::from_chrono(Utc::now() - Duration::days(state.config.stale_booking_days));

    let cursor = bookings.find(stale_booking_filter(cutoff)).await?;
    let stale: Vec<BookingRequest> = cursor.try_collect().await?;

    tracing::info!("Found {} stale bookings", stale.len());

    let mut expired_count: u64 = 0;
    let mut notifications_sent: u64 = 0;

    for booking in &stale {
        let Some(booking_id) = booking.id else {
            continue;
        };

        // Re-apply the sweep predicate per row: a booking decided between
        // the select and this update is skipped, and its student gets no
        // expiry notice.
        let mut row_filter = stale_booking_filter(cutoff);
        row_filter.insert("_id", booking_id);

        let result = match bookings
            .update_one(
                row_filter,
                doc! { "$set": {
                    "status": BookingStatus::Expired.as_str(),
                    "updated_at": BsonDateTime::now(),
                }},
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Failed to expire booking {}: {}", booking_id, e);
                continue;
            }
        };

        if result.modified_count == 0 {
            continue;
        }
        expired_count += 1;

        let title = property_title(&state.db, &booking.property_id).await;
        let body = format!(
            "Your booking request for \"{}\" has expired due to inactivity.",
            title
        );
        match push_notification(&state.db, &booking.student_id, "Booking Expired", &body).await {
            Ok(()) => notifications_sent += 1,
            Err(e) => {
                tracing::error!("Failed to notify student {}: {}", booking.student_id, e);
            }
        }
    }

    tracing::info!(
        "Cleanup complete: expired {}, notified {}",
        expired_count,
        notifications_sent
    );
    Ok(Json(json!({
        "success": true,
        "expiredCount": expired_count,
        "notificationsSent": notifications_sent,
    })))
}

/// Rent reminder sweep over accepted bookings with unpaid rent. A booking
/// is reminded at most once per calendar day; the `last_rent_reminder_on`
/// marker is stamped after the insert(s) succeed.
pub async fn rent_reminders(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    tracing::info!("Starting rent reminder sweep");

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");

    let cursor = bookings.find(unpaid_rent_filter()).await?;
    let candidates: Vec<BookingRequest> = cursor.try_collect().await?;

    tracing::info!("Found {} bookings with unpaid rent", candidates.len());

    let now = Utc::now();
    let mut notifications_sent: u64 = 0;

    for booking in &candidates {
        let Some(due_date) = booking.rent_due_date else {
            continue;
        };
        let Some(booking_id) = booking.id else {
            continue;
        };

        if let Some(last) = booking.last_rent_reminder_on {
            if same_day(last.to_chrono(), now) {
                continue;
            }
        }

        let days = days_until(due_date.to_chrono(), now);
        let title = property_title(&state.db, &booking.property_id).await;

        let mut inserts: Vec<(&str, &str, String)> = Vec::new();
        match classify_rent_due(days) {
            RentReminder::Upcoming => inserts.push((
                booking.student_id.as_str(),
                "Rent Due Soon",
                format!(
                    "Rent for \"{}\" is due in 5 days. Pay within this window and earn +10 points!",
                    title
                ),
            )),
            RentReminder::DueToday => inserts.push((
                booking.student_id.as_str(),
                "Urgent: Rent Due",
                format!("Rent for \"{}\" is due today!", title),
            )),
            RentReminder::DueTomorrow => inserts.push((
                booking.student_id.as_str(),
                "Urgent: Rent Due",
                format!("Rent for \"{}\" is due tomorrow!", title),
            )),
            RentReminder::Overdue(days_overdue) => {
                inserts.push((
                    booking.student_id.as_str(),
                    "Rent Overdue",
                    format!(
                        "Rent for \"{}\" is {} day(s) overdue. Please pay as soon as possible.",
                        title, days_overdue
                    ),
                ));
                inserts.push((
                    booking.owner_id.as_str(),
                    "Tenant Rent Overdue",
                    format!("Rent for \"{}\" is {} day(s) overdue.", title, days_overdue),
                ));
            }
            RentReminder::Quiet => continue,
        }

        let mut sent = 0usize;
        for (user_id, subject, body) in &inserts {
            match push_notification(&state.db, user_id, subject, body).await {
                Ok(()) => {
                    notifications_sent += 1;
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to notify {} for booking {}: {}", user_id, booking_id, e);
                }
            }
        }

        if stamp_after(sent, inserts.len()) {
            if let Err(e) = bookings
                .update_one(
                    doc! { "_id": booking_id },
                    doc! { "$set": { "last_rent_reminder_on": BsonDateTime::from_chrono(now) } },
                )
                .await
            {
                tracing::error!("Failed to stamp reminder marker on {}: {}", booking_id, e);
            }
        }
    }

    tracing::info!("Rent reminder sweep complete, sent {}", notifications_sent);
    Ok(Json(json!({
        "success": true,
        "bookingsChecked": candidates.len(),
        "notificationsSent": notifications_sent,
    })))
}

/// Monthly rating-reminder sweep over accepted bookings created in the
/// previous calendar month. Each side that has not rated yet gets a nudge;
/// the `rating_reminder_sent_at` marker keeps re-runs within the same month
/// quiet.
pub async fn rating_reminders(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    tracing::info!("Starting monthly rating reminders");

    let bookings: Collection<BookingRequest> = state.db.collection("booking_requests");
    let ratings: Collection<Rating> = state.db.collection("ratings");

    let now = Utc::now();
    let (window_start, window_end) = previous_month_window(now);

    tracing::info!("Checking bookings from {} to {}", window_start, window_end);

    let filter = last_month_filter(
        BsonDateTime::from_chrono(window_start),
        BsonDateTime::from_chrono(window_end),
    );
    let cursor = bookings.find(filter).await?;
    let candidates: Vec<BookingRequest> = cursor.try_collect().await?;

    tracing::info!("Found {} bookings from last month", candidates.len());

    let mut notifications_sent: u64 = 0;

    for booking in &candidates {
        let Some(booking_id) = booking.id else {
            continue;
        };

        if let Some(stamped) = booking.rating_reminder_sent_at {
            if same_month(stamped.to_chrono(), now) {
                continue;
            }
        }

        let booking_hex = booking_id.to_hex();
        let mut planned = 0usize;
        let mut sent = 0usize;

        // Student -> owner direction.
        let student_rating = match ratings
            .find_one(doc! {
                "from_user": &booking.student_id,
                "to_user": &booking.owner_id,
                "booking_id": &booking_hex,
            })
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error checking student rating for {}: {}", booking_hex, e);
                continue;
            }
        };

        if student_rating.is_none() {
            planned += 1;
            let title = property_title(&state.db, &booking.property_id).await;
            let body = format!(
                "Please rate your experience with the owner of \"{}\". Your feedback helps our community!",
                title
            );
            match push_notification(&state.db, &booking.student_id, "Rate Your Owner", &body).await {
                Ok(()) => {
                    notifications_sent += 1;
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to remind student for booking {}: {}", booking_hex, e);
                }
            }
        }

        // Owner -> student direction.
        let owner_rating = match ratings
            .find_one(doc! {
                "from_user": &booking.owner_id,
                "to_user": &booking.student_id,
                "booking_id": &booking_hex,
            })
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Error checking owner rating for {}: {}", booking_hex, e);
                continue;
            }
        };

        if owner_rating.is_none() {
            planned += 1;
            let body = "Please rate your experience with your tenant. \
                        Your feedback helps maintain quality in our community!";
            match push_notification(&state.db, &booking.owner_id, "Rate Your Tenant", body).await {
                Ok(()) => {
                    notifications_sent += 1;
                    sent += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to remind owner for booking {}: {}", booking_hex, e);
                }
            }
        }

        if stamp_after(sent, planned) {
            if let Err(e) = bookings
                .update_one(
                    doc! { "_id": booking_id },
                    doc! { "$set": { "rating_reminder_sent_at": BsonDateTime::from_chrono(now) } },
                )
                .await
            {
                tracing::error!("Failed to stamp rating marker on {}: {}", booking_hex, e);
            }
        }
    }

    tracing::info!("Rating reminders complete, sent {}", notifications_sent);
    Ok(Json(json!({
        "success": true,
        "bookingsChecked": candidates.len(),
        "notificationsSent": notifications_sent,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 30, 0).unwrap()
    }

    #[test]
    fn days_until_ignores_time_of_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 23, 59, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2025, 3, 15, 0, 1, 0).unwrap();
        assert_eq!(days_until(due, now), 5);

        let overdue = Utc.with_ymd_and_hms(2025, 3, 7, 18, 0, 0).unwrap();
        assert_eq!(days_until(overdue, now), -3);
    }

    #[test]
    fn rent_policy_matches_due_distance() {
        assert_eq!(classify_rent_due(5), RentReminder::Upcoming);
        assert_eq!(classify_rent_due(1), RentReminder::DueTomorrow);
        assert_eq!(classify_rent_due(0), RentReminder::DueToday);
        assert_eq!(classify_rent_due(-1), RentReminder::Overdue(1));
        assert_eq!(classify_rent_due(-12), RentReminder::Overdue(12));
        assert_eq!(classify_rent_due(2), RentReminder::Quiet);
        assert_eq!(classify_rent_due(4), RentReminder::Quiet);
        assert_eq!(classify_rent_due(6), RentReminder::Quiet);
    }

    #[test]
    fn previous_month_window_is_half_open() {
        let (start, end) = previous_month_window(utc(2025, 3, 14));
        assert_eq!(start, month_start(2025, 2));
        assert_eq!(end, month_start(2025, 3));
    }

    #[test]
    fn previous_month_window_wraps_the_year() {
        let (start, end) = previous_month_window(utc(2025, 1, 2));
        assert_eq!(start, month_start(2024, 12));
        assert_eq!(end, month_start(2025, 1));
    }

    #[test]
    fn payment_window_filter_excludes_confirmed_payments() {
        let now = BsonDateTime::now();
        let filter = payment_window_filter(now);

        assert_eq!(filter.get_str("status").unwrap(), "pending");
        assert_eq!(filter.get_str("payment_status").unwrap(), "none");
        let expires = filter.get_document("expires_at").unwrap();
        assert_eq!(expires.get_datetime("$lt").unwrap(), &now);

        // The sweep updates with the exact predicate it selects with.
        assert_eq!(filter, payment_window_filter(now));
    }

    #[test]
    fn stale_row_update_stays_conditioned_on_pending() {
        let cutoff = BsonDateTime::now();
        let filter = stale_booking_filter(cutoff);

        // A row accepted between select and update no longer matches, so it
        // is neither expired nor notified.
        assert_eq!(filter.get_str("status").unwrap(), "pending");
        let created = filter.get_document("created_at").unwrap();
        assert_eq!(created.get_datetime("$lt").unwrap(), &cutoff);
        assert_eq!(filter, stale_booking_filter(cutoff));
    }

    #[test]
    fn unpaid_rent_filter_targets_accepted_unpaid_rows() {
        let filter = unpaid_rent_filter();

        assert_eq!(filter.get_str("status").unwrap(), "accepted");
        assert!(filter.get_document("rent_due_date").unwrap().contains_key("$ne"));
        assert_eq!(filter.get("rent_paid_date"), Some(&mongodb::bson::Bson::Null));
    }

    #[test]
    fn last_month_filter_bounds_are_half_open() {
        let start = BsonDateTime::from_chrono(month_start(2025, 2));
        let end = BsonDateTime::from_chrono(month_start(2025, 3));
        let filter = last_month_filter(start, end);

        assert_eq!(filter.get_str("status").unwrap(), "accepted");
        let created = filter.get_document("created_at").unwrap();
        assert_eq!(created.get_datetime("$gte").unwrap(), &start);
        assert_eq!(created.get_datetime("$lt").unwrap(), &end);
    }

    #[test]
    fn reminder_marker_waits_for_every_insert() {
        assert!(stamp_after(1, 1));
        assert!(stamp_after(2, 2));
        // A partial failure leaves the row eligible for the next run.
        assert!(!stamp_after(1, 2));
        assert!(!stamp_after(0, 1));
        assert!(!stamp_after(0, 0));
    }

    #[test]
    fn same_day_and_month_comparisons() {
        assert!(same_day(utc(2025, 6, 1), Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 1).unwrap()));
        assert!(!same_day(utc(2025, 6, 1), utc(2025, 6, 2)));
        assert!(same_month(utc(2025, 6, 1), utc(2025, 6, 30)));
        assert!(!same_month(utc(2025, 6, 1), utc(2024, 6, 1)));
    }
}
