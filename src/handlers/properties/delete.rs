use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde_json::json;

use super::{ensure_can_modify, find_property, parse_property_id};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// DELETE /api/properties/:id - owner or admin only. A repeat delete 404s
/// because the lookup runs first.
pub async fn remove(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_property_id(&id)?;
    let property = find_property(&state.pool, id).await?;
    ensure_can_modify(&property, &current, "delete")?;

    sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(json!({ "success": true, "data": {} })))
}
