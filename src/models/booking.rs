use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Booking lifecycle states. `Accepted`, `Rejected` and `Expired` are
/// terminal; only `Pending` admits transitions.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }
}

/// Single source of truth for payment confirmation. There is no separate
/// `payment_confirmed` boolean; the sweeps and the payment handler read and
/// write this one field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    None,
    Confirmed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::None => "none",
            PaymentStatus::Confirmed => "confirmed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOption {
    Deposit,
    FullInsurance,
}

impl PaymentOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOption::Deposit => "deposit",
            PaymentOption::FullInsurance => "full_insurance",
        }
    }
}

/// Database model for the booking_requests collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub property_id: String,
    pub student_id: String,
    // Copied from the property at creation, never taken from the client.
    pub owner_id: String,

    pub status: BookingStatus,

    // Payment window, populated at insert.
    pub deposit_amount: f64,
    pub vodafone_number: String,
    pub expires_at: BsonDateTime,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_option: Option<PaymentOption>,
    #[serde(default)]
    pub payment_proof_url: Option<String>,

    // Rent cycle, set on acceptance. A null rent_paid_date means unpaid.
    #[serde(default)]
    pub rent_due_date: Option<BsonDateTime>,
    #[serde(default)]
    pub rent_paid_date: Option<BsonDateTime>,

    pub student_can_rate: bool,
    pub owner_can_rate: bool,

    // Reminder de-duplication markers, stamped by the sweep jobs.
    #[serde(default)]
    pub last_rent_reminder_on: Option<BsonDateTime>,
    #[serde(default)]
    pub rating_reminder_sent_at: Option<BsonDateTime>,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub property_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub decision: String, // "accepted" or "rejected"
}

#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    pub payment_option: PaymentOption,
    #[serde(default)]
    pub payment_proof_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RentPaymentRequest {
    pub paid_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub role: Option<String>, // "student" (default) or "owner"
}
