use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// JWT claims carried through request extensions by the auth middleware.
/// Caller identity is always taken from here, never from request bodies.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_type: UserType,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Owner,
}

/// Database model for the profiles collection. `user_id` matches the auth
/// subject; there is one profile per account.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_id: String,
    pub user_type: UserType,
    // Profiles are built up incrementally through upserts.
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub civil_id_url: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
    #[serde(default)]
    pub level: Option<String>,

    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl Profile {
    /// Students must complete these fields before they can book. Returns the
    /// names of the missing ones.
    pub fn missing_booking_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let empty = |f: &Option<String>| f.as_deref().map_or(true, |s| s.is_empty());

        if empty(&self.civil_id_url) {
            missing.push("civil_id_url");
        }
        if empty(&self.city) {
            missing.push("city");
        }
        if empty(&self.area) {
            missing.push("area");
        }
        if empty(&self.college) {
            missing.push("college");
        }
        if empty(&self.level) {
            missing.push("level");
        }
        missing
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub civil_id_url: Option<String>,
    pub city: Option<String>,
    pub area: Option<String>,
    pub college: Option<String>,
    pub level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(civil_id: Option<&str>, city: Option<&str>) -> Profile {
        Profile {
            id: None,
            user_id: "u1".to_string(),
            user_type: UserType::Student,
            full_name: "Test Student".to_string(),
            phone: "0100000000".to_string(),
            civil_id_url: civil_id.map(String::from),
            city: city.map(String::from),
            area: Some("Dokki".to_string()),
            college: Some("Engineering".to_string()),
            level: Some("3".to_string()),
            created_at: BsonDateTime::now(),
            updated_at: BsonDateTime::now(),
        }
    }

    #[test]
    fn complete_profile_has_no_missing_fields() {
        let p = profile(Some("https://example.com/id.png"), Some("Giza"));
        assert!(p.missing_booking_fields().is_empty());
    }

    #[test]
    fn missing_and_empty_fields_are_reported() {
        let p = profile(None, Some(""));
        assert_eq!(p.missing_booking_fields(), vec!["civil_id_url", "city"]);
    }
}
