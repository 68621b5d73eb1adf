use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Database model for the notifications collection. Inserted by the sweep
/// jobs and the booking decision handler, read and cleared by the recipient.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    pub user_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: BsonDateTime,
}

impl Notification {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Notification {
            id: None,
            user_id: user_id.into(),
            title: title.into(),
            body: body.into(),
            read: false,
            created_at: BsonDateTime::now(),
        }
    }
}
