use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    Collection,
};
use serde_json::json;

use crate::{
    errors::{AppError, Result},
    models::{
        profile::{Claims, Profile, UpdateProfileRequest},
        rating::Rating,
    },
    state::AppState,
};

pub async fn get_my_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Profile>> {
    let collection: Collection<Profile> = state.db.collection("profiles");

    let profile = collection
        .find_one(doc! { "user_id": &claims.sub })
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Profile>> {
    let collection: Collection<Profile> = state.db.collection("profiles");

    let profile = collection
        .find_one(doc! { "user_id": &user_id })
        .await?
        .ok_or(AppError::ProfileNotFound)?;

    Ok(Json(profile))
}

/// Upserts the caller's profile. user_type comes from the token, never from
/// the body.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Profile> = state.db.collection("profiles");

    let now = BsonDateTime::now();
    let mut set = doc! { "updated_at": now };
    if let Some(full_name) = payload.full_name {
        set.insert("full_name", full_name);
    }
    if let Some(phone) = payload.phone {
        set.insert("phone", phone);
    }
    if let Some(civil_id_url) = payload.civil_id_url {
        set.insert("civil_id_url", civil_id_url);
    }
    if let Some(city) = payload.city {
        set.insert("city", city);
    }
    if let Some(area) = payload.area {
        set.insert("area", area);
    }
    if let Some(college) = payload.college {
        set.insert("college", college);
    }
    if let Some(level) = payload.level {
        set.insert("level", level);
    }

    let user_type = mongodb::bson::to_bson(&claims.user_type)
        .map_err(|e| AppError::invalid_data(e.to_string()))?;

    collection
        .update_one(
            doc! { "user_id": &claims.sub },
            doc! {
                "$set": set,
                "$setOnInsert": {
                    "user_id": &claims.sub,
                    "user_type": user_type,
                    "created_at": now,
                },
            },
        )
        .upsert(true)
        .await?;

    Ok(Json(json!({ "success": true })))
}

// Average stars received by a user, 0 when unrated.
pub async fn get_rating_summary(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let collection: Collection<Rating> = state.db.collection("ratings");

    let cursor = collection.find(doc! { "to_user": &user_id }).await?;
    let ratings: Vec<Rating> = cursor.try_collect().await?;

    let count = ratings.len();
    let average = if count == 0 {
        0.0
    } else {
        ratings.iter().map(|r| r.stars as f64).sum::<f64>() / count as f64
    };

    Ok(Json(json!({
        "user_id": user_id,
        "average": average,
        "count": count,
    })))
}
