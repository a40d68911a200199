use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Property, Role, User};

mod by_user;
mod create;
mod delete;
mod get;
mod list;
mod update;

pub use by_user::list_by_user;
pub use create::create;
pub use delete::remove;
pub use get::get_one;
pub use list::list;
pub use update::update;

/// Restricted owner projection embedded in list/get responses
#[derive(Debug, Serialize, FromRow)]
struct OwnerSummary {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
}

/// Parse a path id, surfacing a malformed key as a client error
fn parse_property_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw)
        .map_err(|_| ApiError::bad_request(format!("`{raw}` is not a valid property id")))
}

async fn find_property(pool: &PgPool, id: Uuid) -> Result<Property, ApiError> {
    sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Property not found"))
}

/// Mutations are allowed for the owner or an admin only. Shared by update
/// and delete; `action` names the operation in the 403 message.
fn ensure_can_modify(property: &Property, user: &User, action: &str) -> Result<(), ApiError> {
    if property.user_id != user.id && user.role != Role::Admin {
        return Err(ApiError::forbidden(format!(
            "Not authorized to {action} this property"
        )));
    }
    Ok(())
}

/// Swap each row's owner id for the restricted owner projection. Owner rows
/// are fetched in one batch keyed by the distinct ids on the page.
async fn populate_owners(pool: &PgPool, properties: Vec<Property>) -> Result<Vec<Value>, ApiError> {
    let mut owner_ids: Vec<Uuid> = properties.iter().map(|p| p.user_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();

    let owners: Vec<OwnerSummary> = if owner_ids.is_empty() {
        Vec::new()
    } else {
        sqlx::query_as::<_, OwnerSummary>(
            "SELECT id, name, email, phone FROM users WHERE id = ANY($1)",
        )
        .bind(&owner_ids)
        .fetch_all(pool)
        .await?
    };

    let mut by_id = HashMap::with_capacity(owners.len());
    for owner in owners {
        let id = owner.id;
        by_id.insert(id, serde_json::to_value(owner).map_err(serialize_error)?);
    }

    let mut out = Vec::with_capacity(properties.len());
    for property in properties {
        let owner = by_id.get(&property.user_id).cloned();
        let mut value = serde_json::to_value(property).map_err(serialize_error)?;
        if let (Value::Object(map), Some(owner)) = (&mut value, owner) {
            map.insert("user".to_string(), owner);
        }
        out.push(value);
    }
    Ok(out)
}

fn serialize_error(err: serde_json::Error) -> ApiError {
    tracing::error!("response serialization failed: {}", err);
    ApiError::internal("Failed to format response")
}
