//! The single authority for booking status transitions. Every call site
//! (the owner decision handler and both expiry sweeps) either routes through
//! [`transition`] or conditions its update on `status = pending`, so a
//! terminal booking can never be mutated back to life.

use crate::errors::{AppError, Result};
use crate::models::booking::BookingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    /// Owner accepts the request.
    Accept,
    /// Owner rejects the request.
    Reject,
    /// The payment window (`expires_at`) elapsed without confirmed payment.
    PaymentWindowElapsed,
    /// The request sat pending longer than the stale-booking retention.
    StaleTimeout,
}

impl BookingEvent {
    fn target(&self) -> BookingStatus {
        match self {
            BookingEvent::Accept => BookingStatus::Accepted,
            BookingEvent::Reject => BookingStatus::Rejected,
            BookingEvent::PaymentWindowElapsed | BookingEvent::StaleTimeout => {
                BookingStatus::Expired
            }
        }
    }
}

/// Computes the status an event moves a booking to. Re-delivering an event
/// whose target matches the current state is a no-op; any other event
/// against a terminal state is rejected.
pub fn transition(current: BookingStatus, event: BookingEvent) -> Result<BookingStatus> {
    let target = event.target();

    if !current.is_terminal() {
        return Ok(target);
    }
    if current == target {
        // Idempotent re-delivery, nothing to do.
        return Ok(current);
    }

    Err(AppError::IllegalTransition(format!(
        "cannot apply {:?} to a booking in state {}",
        event,
        current.as_str()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_accepts_every_event() {
        assert_eq!(
            transition(BookingStatus::Pending, BookingEvent::Accept).unwrap(),
            BookingStatus::Accepted
        );
        assert_eq!(
            transition(BookingStatus::Pending, BookingEvent::Reject).unwrap(),
            BookingStatus::Rejected
        );
        assert_eq!(
            transition(BookingStatus::Pending, BookingEvent::PaymentWindowElapsed).unwrap(),
            BookingStatus::Expired
        );
        assert_eq!(
            transition(BookingStatus::Pending, BookingEvent::StaleTimeout).unwrap(),
            BookingStatus::Expired
        );
    }

    #[test]
    fn reissuing_the_same_decision_is_a_noop() {
        assert_eq!(
            transition(BookingStatus::Accepted, BookingEvent::Accept).unwrap(),
            BookingStatus::Accepted
        );
        assert_eq!(
            transition(BookingStatus::Rejected, BookingEvent::Reject).unwrap(),
            BookingStatus::Rejected
        );
        assert_eq!(
            transition(BookingStatus::Expired, BookingEvent::StaleTimeout).unwrap(),
            BookingStatus::Expired
        );
    }

    #[test]
    fn terminal_states_reject_other_events() {
        assert!(transition(BookingStatus::Accepted, BookingEvent::Reject).is_err());
        assert!(transition(BookingStatus::Rejected, BookingEvent::Accept).is_err());
        assert!(transition(BookingStatus::Expired, BookingEvent::Accept).is_err());
        assert!(transition(BookingStatus::Accepted, BookingEvent::PaymentWindowElapsed).is_err());
    }
}
