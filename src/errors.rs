// src/errors.rs
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("MongoDB error: {0}")]
    MongoDB(#[from] mongodb::error::Error),

    #[error("Invalid ObjectId: {0}")]
    InvalidObjectId(String),

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Property not found")]
    PropertyNotFound,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Notification not found")]
    NotificationNotFound,

    #[error("A pending booking already exists for this property")]
    DuplicateBooking,

    #[error("Profile incomplete: {0}")]
    ProfileIncomplete(String),

    #[error("Illegal booking transition: {0}")]
    IllegalTransition(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::MongoDB(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()),
            AppError::InvalidObjectId(_) => (StatusCode::BAD_REQUEST, "Invalid ID format".to_string()),
            AppError::BookingNotFound => (StatusCode::NOT_FOUND, "Booking not found".to_string()),
            AppError::PropertyNotFound => (StatusCode::NOT_FOUND, "Property not found".to_string()),
            AppError::ProfileNotFound => (StatusCode::NOT_FOUND, "Profile not found".to_string()),
            AppError::NotificationNotFound => (StatusCode::NOT_FOUND, "Notification not found".to_string()),
            AppError::DuplicateBooking => (StatusCode::CONFLICT, "Duplicate booking request".to_string()),
            AppError::ProfileIncomplete(_) => (StatusCode::BAD_REQUEST, "Profile incomplete".to_string()),
            AppError::IllegalTransition(_) => (StatusCode::CONFLICT, "Illegal booking transition".to_string()),
            AppError::Unauthorized => (StatusCode::FORBIDDEN, "Unauthorized access".to_string()),
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "message": self.to_string(),
            "success": false,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<mongodb::bson::oid::Error> for AppError {
    fn from(err: mongodb::bson::oid::Error) -> Self {
        AppError::InvalidObjectId(err.to_string())
    }
}

impl AppError {
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        AppError::ValidationError(msg.into())
    }

    /// Maps the unique-index violation on (student_id, property_id, pending)
    /// to the conflict error callers can present specifically.
    pub fn from_insert(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            AppError::DuplicateBooking
        } else {
            AppError::MongoDB(err)
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref we)) if we.code == 11000
    )
}

pub type Result<T> = std::result::Result<T, AppError>;
