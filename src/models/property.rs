use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RentalType {
    Apartment,
    Room,
    Bed,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    Any,
    Male,
    Female,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    Available,
    Reserved,
    Unavailable,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Reserved => "reserved",
            PropertyStatus::Unavailable => "unavailable",
        }
    }
}

/// Database model for the properties collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Property {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub address: String,
    pub city: String,
    pub area: String,
    pub price: f64,
    pub rental_type: RentalType,
    pub gender_preference: GenderPreference,
    pub furnished: bool,
    pub status: PropertyStatus,
    #[serde(default)]
    pub image_urls: Vec<String>,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    pub city: String,
    pub area: String,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    pub rental_type: RentalType,
    pub gender_preference: GenderPreference,
    pub furnished: bool,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub price: Option<f64>,
    pub rental_type: Option<RentalType>,
    pub gender_preference: Option<GenderPreference>,
    pub furnished: Option<bool>,
    pub status: Option<PropertyStatus>,
    pub image_urls: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct PropertyQuery {
    pub search: Option<String>,
    pub rental_type: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub furnished: Option<bool>,
}
