use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;
use sqlx::types::Json as Jsonb;

use super::{ensure_can_modify, find_property, parse_property_id};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Property, PropertyPayload};
use crate::state::AppState;

/// PUT /api/properties/:id - partial update by the owner or an admin.
/// Absent fields bind NULL and COALESCE keeps the stored value; ownership
/// is never part of the SET list.
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PropertyPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_property_id(&id)?;
    let property = find_property(&state.pool, id).await?;
    ensure_can_modify(&property, &current, "update")?;

    let update = payload.validate_update().map_err(ApiError::validation)?;

    let updated = sqlx::query_as::<_, Property>(
        r#"
        UPDATE properties SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            price = COALESCE($4, price),
            property_type = COALESCE($5, property_type),
            status = COALESCE($6, status),
            bedrooms = COALESCE($7, bedrooms),
            bathrooms = COALESCE($8, bathrooms),
            area = COALESCE($9, area),
            address = COALESCE($10, address),
            location = COALESCE($11, location),
            amenities = COALESCE($12, amenities),
            images = COALESCE($13, images),
            year_built = COALESCE($14, year_built),
            parking = COALESCE($15, parking),
            featured = COALESCE($16, featured),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(update.title)
    .bind(update.description)
    .bind(update.price)
    .bind(update.property_type)
    .bind(update.status)
    .bind(update.bedrooms)
    .bind(update.bathrooms)
    .bind(update.area)
    .bind(update.address.map(Jsonb))
    .bind(update.location.map(Jsonb))
    .bind(update.amenities)
    .bind(update.images)
    .bind(update.year_built)
    .bind(update.parking)
    .bind(update.featured)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({ "success": true, "data": updated })))
}
