use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::populate_owners;
use crate::error::ApiError;
use crate::query::PropertyQuery;
use crate::state::AppState;

/// GET /api/properties - filtered, sorted, paginated listing (public)
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let query = PropertyQuery::from_params(&params, &state.config.pagination)?;

    // Total matching the filter, ignoring the window
    let total = query.count(&state.pool).await?;
    let properties = query.fetch(&state.pool).await?;
    let pagination = query.pagination(total);

    let data: Vec<_> = populate_owners(&state.pool, properties)
        .await?
        .into_iter()
        .map(|item| query.apply_select(item))
        .collect();

    Ok(Json(json!({
        "success": true,
        "count": data.len(),
        "pagination": pagination,
        "data": data,
    })))
}
