use axum::{response::IntoResponse, Extension, Json};

use crate::middleware::CurrentUser;

/// GET /api/auth/me - profile of the authenticated caller. The password
/// hash is skipped by the User serializer.
pub async fn me(Extension(current): Extension<CurrentUser>) -> impl IntoResponse {
    Json(current.0)
}
