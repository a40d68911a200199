use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::auth::{issue_token, password};
use crate::error::ApiError;
use crate::models::{LoginPayload, User};
use crate::state::AppState;

/// POST /api/auth/login - exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (
        payload.email.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        payload.password.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::bad_request("Please provide an email and password"));
    };

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.to_lowercase())
        .fetch_optional(&state.pool)
        .await?;

    // Same response for unknown email and wrong password
    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid credentials"));
    };
    if !password::verify_password(password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let token = issue_token(user.id, &state.config.security)?;

    Ok(Json(json!({
        "_id": user.id,
        "email": user.email,
        "token": token,
    })))
}
