use axum::{
    extract::{Path, Query, State},
    response::Json,
    Extension,
};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime},
    Collection, Database,
};
use serde_json::json;
use validator::Validate;

use crate::{
    errors::{AppError, Result},
    models::{
        profile::Claims,
        property::{
            CreatePropertyRequest, Property, PropertyQuery, PropertyStatus,
            UpdatePropertyRequest,
        },
    },
    state::AppState,
};

/// Display title for notification bodies, with the generic fallback used
/// when the property row is gone or the id is malformed.
pub async fn property_title(db: &Database, property_id: &str) -> String {
    let collection: Collection<Property> = db.collection("properties");

    let Ok(object_id) = ObjectId::parse_str(property_id) else {
        return "a property".to_string();
    };

    match collection.find_one(doc! { "_id": object_id }).await {
        Ok(Some(property)) => property.title,
        _ => "a property".to_string(),
    }
}

async fn load_property(state: &AppState, id: &str) -> Result<(ObjectId, Property)> {
    let collection: Collection<Property> = state.db.collection("properties");
    let object_id = ObjectId::parse_str(id)?;

    let property = collection
        .find_one(doc! { "_id": object_id })
        .await?
        .ok_or(AppError::PropertyNotFound)?;

    Ok((object_id, property))
}

// Available listings with optional filters, newest first.
pub async fn get_properties(
    State(state): State<AppState>,
    Query(query): Query<PropertyQuery>,
) -> Result<Json<Vec<Property>>> {
    let collection: Collection<Property> = state.db.collection("properties");

    let mut filter = doc! { "status": PropertyStatus::Available.as_str() };

    if let Some(search) = &query.search {
        if !search.is_empty() {
            let pattern = doc! { "$regex": search, "$options": "i" };
            filter.insert(
                "$or",
                vec![
                    doc! { "title": pattern.clone() },
                    doc! { "address": pattern.clone() },
                    doc! { "description": pattern },
                ],
            );
        }
    }

    if let Some(rental_type) = &query.rental_type {
        if rental_type != "all" {
            filter.insert("rental_type", rental_type);
        }
    }

    let mut price = doc! {};
    if let Some(min) = query.min_price {
        price.insert("$gte", min);
    }
    if let Some(max) = query.max_price {
        price.insert("$lte", max);
    }
    if !price.is_empty() {
        filter.insert("price", price);
    }

    if let Some(furnished) = query.furnished {
        filter.insert("furnished", furnished);
    }

    let cursor = collection.find(filter).await?;
    let mut properties: Vec<Property> = cursor.try_collect().await?;

    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(properties))
}

pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>> {
    let (_, property) = load_property(&state, &id).await?;
    Ok(Json(property))
}

// The caller's own listings, any status.
pub async fn get_owner_properties(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Property>>> {
    let collection: Collection<Property> = state.db.collection("properties");

    let cursor = collection.find(doc! { "owner_id": &claims.sub }).await?;
    let mut properties: Vec<Property> = cursor.try_collect().await?;

    properties.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(properties))
}

pub async fn create_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreatePropertyRequest>,
) -> Result<Json<Property>> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let collection: Collection<Property> = state.db.collection("properties");

    let now = BsonDateTime::now();
    let property = Property {
        id: Some(ObjectId::new()),
        owner_id: claims.sub.clone(),
        title: payload.title,
        description: payload.description,
        address: payload.address,
        city: payload.city,
        area: payload.area,
        price: payload.price,
        rental_type: payload.rental_type,
        gender_preference: payload.gender_preference,
        furnished: payload.furnished,
        status: PropertyStatus::Available,
        image_urls: payload.image_urls,
        created_at: now,
        updated_at: now,
    };

    collection.insert_one(&property).await?;

    tracing::info!("Property \"{}\" listed by {}", property.title, claims.sub);
    Ok(Json(property))
}

pub async fn update_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, property) = load_property(&state, &id).await?;

    if property.owner_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    let mut set = doc! { "updated_at": BsonDateTime::now() };
    if let Some(title) = payload.title {
        set.insert("title", title);
    }
    if let Some(description) = payload.description {
        set.insert("description", description);
    }
    if let Some(address) = payload.address {
        set.insert("address", address);
    }
    if let Some(city) = payload.city {
        set.insert("city", city);
    }
    if let Some(area) = payload.area {
        set.insert("area", area);
    }
    if let Some(price) = payload.price {
        set.insert("price", price);
    }
    if let Some(rental_type) = payload.rental_type {
        set.insert("rental_type", mongodb::bson::to_bson(&rental_type).unwrap_or(Bson::Null));
    }
    if let Some(gender_preference) = payload.gender_preference {
        set.insert(
            "gender_preference",
            mongodb::bson::to_bson(&gender_preference).unwrap_or(Bson::Null),
        );
    }
    if let Some(furnished) = payload.furnished {
        set.insert("furnished", furnished);
    }
    if let Some(status) = payload.status {
        set.insert("status", status.as_str());
    }
    if let Some(image_urls) = payload.image_urls {
        set.insert("image_urls", image_urls);
    }

    let collection: Collection<Property> = state.db.collection("properties");
    collection
        .update_one(doc! { "_id": object_id }, doc! { "$set": set })
        .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let (object_id, property) = load_property(&state, &id).await?;

    if property.owner_id != claims.sub {
        return Err(AppError::Unauthorized);
    }

    let collection: Collection<Property> = state.db.collection("properties");
    collection.delete_one(doc! { "_id": object_id }).await?;

    tracing::info!("Property {} deleted by {}", id, claims.sub);
    Ok(Json(json!({ "success": true })))
}
