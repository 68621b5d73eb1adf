use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    Collection, Database,
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    models::{notification::Notification, profile::Claims},
    state::AppState,
};

/// Single producer for notification rows, shared by the decision handler
/// and the sweep jobs.
pub async fn push_notification(
    db: &Database,
    user_id: &str,
    title: &str,
    body: &str,
) -> Result<()> {
    let collection: Collection<Notification> = db.collection("notifications");
    collection
        .insert_one(Notification::new(user_id, title, body))
        .await?;
    Ok(())
}

// Caller's notifications, newest first, capped at 50.
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Notification>>> {
    let collection: Collection<Notification> = state.db.collection("notifications");

    let cursor = collection.find(doc! { "user_id": &claims.sub }).await?;
    let mut notifications: Vec<Notification> = cursor.try_collect().await?;

    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications.truncate(50);

    Ok(Json(notifications))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Notification> = state.db.collection("notifications");
    let object_id = ObjectId::parse_str(&id)?;

    let result = collection
        .update_one(
            doc! { "_id": object_id, "user_id": &claims.sub },
            doc! { "$set": { "read": true } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(AppError::NotificationNotFound);
    }

    Ok(Json(json!({ "success": true })))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Notification> = state.db.collection("notifications");

    let result = collection
        .update_many(
            doc! { "user_id": &claims.sub, "read": false },
            doc! { "$set": { "read": true } },
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "modified_count": result.modified_count,
    })))
}

pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Notification> = state.db.collection("notifications");
    let object_id = ObjectId::parse_str(&id)?;

    let result = collection
        .delete_one(doc! { "_id": object_id, "user_id": &claims.sub })
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotificationNotFound);
    }

    Ok(Json(json!({ "success": true })))
}
