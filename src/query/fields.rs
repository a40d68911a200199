//! The filter/sort allow-list. Query-string field names are the API's
//! camelCase names; only entries in this table ever reach SQL, and values are
//! parsed by the column's kind before binding.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::QueryError;
use super::types::BindValue;
use crate::models::{PropertyStatus, PropertyType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Int,
    Float,
    Money,
    Bool,
    Uuid,
    Timestamp,
    PropertyType,
    Status,
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub api: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
    pub filterable: bool,
    pub sortable: bool,
}

const fn field(
    api: &'static str,
    column: &'static str,
    kind: FieldKind,
    filterable: bool,
    sortable: bool,
) -> FieldSpec {
    FieldSpec { api, column, kind, filterable, sortable }
}

pub const FIELDS: &[FieldSpec] = &[
    field("title", "title", FieldKind::Text, true, true),
    field("price", "price", FieldKind::Money, true, true),
    field("type", "property_type", FieldKind::PropertyType, true, true),
    field("status", "status", FieldKind::Status, true, true),
    field("bedrooms", "bedrooms", FieldKind::Int, true, true),
    field("bathrooms", "bathrooms", FieldKind::Float, true, true),
    field("area", "area", FieldKind::Float, true, true),
    field("yearBuilt", "year_built", FieldKind::Int, true, true),
    field("parking", "parking", FieldKind::Int, true, false),
    field("featured", "featured", FieldKind::Bool, true, false),
    field("user", "user_id", FieldKind::Uuid, true, false),
    field("createdAt", "created_at", FieldKind::Timestamp, true, true),
    field("updatedAt", "updated_at", FieldKind::Timestamp, true, true),
];

/// Every JSON key a `select` projection may keep. `_id` always survives.
pub const SELECTABLE: &[&str] = &[
    "title", "description", "price", "type", "status", "bedrooms", "bathrooms", "area",
    "address", "location", "amenities", "images", "yearBuilt", "parking", "user", "featured",
    "createdAt", "updatedAt",
];

pub fn filter_field(api: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.filterable && f.api == api)
}

pub fn sort_field(api: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.sortable && f.api == api)
}

pub fn parse_value(spec: &FieldSpec, raw: &str) -> Result<BindValue, QueryError> {
    let invalid = || QueryError::InvalidValue {
        field: spec.api.to_string(),
        value: raw.to_string(),
    };

    match spec.kind {
        FieldKind::Text => Ok(BindValue::Text(raw.to_string())),
        FieldKind::Int => raw.parse::<i64>().map(BindValue::Int).map_err(|_| invalid()),
        FieldKind::Float => raw.parse::<f64>().map(BindValue::Float).map_err(|_| invalid()),
        FieldKind::Money => raw.parse::<Decimal>().map(BindValue::Money).map_err(|_| invalid()),
        FieldKind::Bool => match raw {
            "true" => Ok(BindValue::Bool(true)),
            "false" => Ok(BindValue::Bool(false)),
            _ => Err(invalid()),
        },
        FieldKind::Uuid => Uuid::parse_str(raw).map(BindValue::Uuid).map_err(|_| invalid()),
        FieldKind::Timestamp => DateTime::parse_from_rfc3339(raw)
            .map(|t| BindValue::Timestamp(t.with_timezone(&Utc)))
            .map_err(|_| invalid()),
        FieldKind::PropertyType => raw
            .parse::<PropertyType>()
            .map(|t| BindValue::Text(t.as_str().to_string()))
            .map_err(|_| invalid()),
        FieldKind::Status => raw
            .parse::<PropertyStatus>()
            .map(|s| BindValue::Text(s.as_str().to_string()))
            .map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_names_map_to_columns() {
        let spec = filter_field("yearBuilt").expect("known field");
        assert_eq!(spec.column, "year_built");
        assert!(filter_field("year_built").is_none());
    }

    #[test]
    fn enum_values_are_checked_before_binding() {
        let spec = filter_field("type").unwrap();
        assert_eq!(parse_value(spec, "house").unwrap(), BindValue::Text("house".to_string()));
        assert!(parse_value(spec, "castle").is_err());
    }

    #[test]
    fn numeric_values_must_parse() {
        let spec = filter_field("price").unwrap();
        assert!(matches!(parse_value(spec, "100000").unwrap(), BindValue::Money(_)));
        assert!(parse_value(spec, "cheap").is_err());
    }

    #[test]
    fn parking_is_not_sortable() {
        assert!(sort_field("parking").is_none());
        assert!(filter_field("parking").is_some());
    }
}
