use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;
use sqlx::types::Json as Jsonb;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Property, PropertyPayload};
use crate::state::AppState;

/// POST /api/properties - the owner is always the authenticated caller,
/// whatever the body says
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<PropertyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new = payload.validate_create().map_err(ApiError::validation)?;

    let property = sqlx::query_as::<_, Property>(
        r#"
        INSERT INTO properties (
            id, title, description, price, property_type, status,
            bedrooms, bathrooms, area, address, location, amenities,
            images, year_built, parking, user_id, featured
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.property_type)
    .bind(new.status)
    .bind(new.bedrooms)
    .bind(new.bathrooms)
    .bind(new.area)
    .bind(Jsonb(&new.address))
    .bind(new.location.as_ref().map(Jsonb))
    .bind(&new.amenities)
    .bind(&new.images)
    .bind(new.year_built)
    .bind(new.parking)
    .bind(current.id)
    .bind(new.featured)
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": property }))))
}
