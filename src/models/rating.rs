use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Database model for the ratings collection. One rating per
/// (from_user, booking) direction; eligibility is gated by the can_rate
/// flags on the booking.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Rating {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub from_user: String,
    pub to_user: String,
    pub booking_id: String,
    pub stars: i32,
    #[serde(default)]
    pub comment: Option<String>,

    pub created_at: BsonDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRatingRequest {
    pub booking_id: String,
    #[validate(range(min = 1, max = 5, message = "stars must be between 1 and 5"))]
    pub stars: i32,
    #[serde(default)]
    pub comment: Option<String>,
}
