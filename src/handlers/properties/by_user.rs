use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Property;
use crate::state::AppState;

/// GET /api/properties/user/:userId - listings owned by one user (public).
/// The owner field stays a bare id here; no population.
pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = Uuid::parse_str(&user_id)
        .map_err(|_| ApiError::bad_request(format!("`{user_id}` is not a valid user id")))?;

    let properties = sqlx::query_as::<_, Property>(
        "SELECT * FROM properties WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(json!({
        "success": true,
        "count": properties.len(),
        "data": properties,
    })))
}
