use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{issue_token, password};
use crate::error::ApiError;
use crate::models::{RegisterPayload, User};
use crate::state::AppState;

/// POST /api/auth/register - create an account and hand back a token
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let new_user = payload.validate().map_err(ApiError::validation)?;

    let existing = sqlx::query("SELECT id FROM users WHERE email = $1")
        .bind(&new_user.email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::duplicate("User already exists"));
    }

    let password_hash = password::hash_password(&new_user.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, name, email, password_hash, phone, role)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&password_hash)
    .bind(&new_user.phone)
    .bind(new_user.role)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| match &e {
        // Racing registrations land on the unique index
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ApiError::duplicate("User already exists")
        }
        _ => ApiError::from(e),
    })?;

    let token = issue_token(user.id, &state.config.security)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "_id": user.id,
            "name": user.name,
            "email": user.email,
            "token": token,
        })),
    ))
}
