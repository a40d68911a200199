use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::models::{Role, User};
use crate::state::AppState;

/// The resolved caller, attached to request extensions once the bearer token
/// verifies and the user still exists in the store.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

/// Bearer-token authentication middleware. Each failed transition
/// short-circuits with 401: no/malformed header, bad signature or expiry,
/// or a subject that no longer resolves to a user.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Not authorized, no token"))?;

    let claims = verify_token(&token, &state.config.security.jwt_secret)
        .map_err(|_| ApiError::unauthorized("Not authorized, token failed"))?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(claims.sub)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized, token failed"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Secondary role gate, run after authentication
pub fn authorize(user: &User, roles: &[Role]) -> Result<(), ApiError> {
    if roles.contains(&user.role) {
        return Ok(());
    }
    Err(ApiError::forbidden(format!(
        "User role `{}` is not authorized to access this route",
        user.role
    )))
}

/// Roles allowed to create listings
const LISTING_ROLES: &[Role] = &[Role::User, Role::Agent, Role::Admin];

pub async fn require_listing_role(
    Extension(current): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    authorize(&current, LISTING_ROLES)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer(&HeaderMap::new()).is_none());
    }

    #[test]
    fn rejects_non_bearer_scheme() {
        assert!(extract_bearer(&headers_with("Basic dXNlcg==")).is_none());
    }

    #[test]
    fn rejects_empty_token() {
        assert!(extract_bearer(&headers_with("Bearer ")).is_none());
    }
}
