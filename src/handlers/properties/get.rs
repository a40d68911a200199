use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use super::{find_property, parse_property_id, populate_owners};
use crate::error::ApiError;
use crate::state::AppState;

/// GET /api/properties/:id (public)
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_property_id(&id)?;
    let property = find_property(&state.pool, id).await?;

    let data = populate_owners(&state.pool, vec![property])
        .await?
        .pop()
        .unwrap_or(Value::Null);

    Ok(Json(json!({ "success": true, "data": data })))
}
