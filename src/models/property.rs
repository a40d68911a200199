use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::FieldError;

text_enum!(PropertyType, "property type" {
    House => "house",
    Apartment => "apartment",
    Condo => "condo",
    Townhouse => "townhouse",
    Land => "land",
    Commercial => "commercial",
});

text_enum!(PropertyStatus, "property status" {
    ForSale => "for-sale",
    ForRent => "for-rent",
    Sold => "sold",
    Rented => "rented",
});

impl Default for PropertyStatus {
    fn default() -> Self {
        PropertyStatus::ForSale
    }
}

pub const MAX_TITLE_LENGTH: usize = 100;
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "USA".to_string()
}

/// GeoJSON-style point. Stored verbatim; never interpreted server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type", default = "default_point_kind")]
    pub kind: String,
    /// [longitude, latitude]
    pub coordinates: Vec<f64>,
}

fn default_point_kind() -> String {
    "Point".to_string()
}

/// A listing row. Owner is a bare user id here; list/get responses swap it
/// for a restricted owner projection after the fetch.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    pub address: Json<Address>,
    pub location: Option<Json<GeoPoint>>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub year_built: Option<i32>,
    pub parking: Option<i32>,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST/PUT /api/properties. Everything optional so create can
/// report all missing fields at once and update can stay partial. Any
/// `user` key in the body is ignored: ownership comes from the caller.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    pub address: Option<AddressPayload>,
    pub location: Option<GeoPoint>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub year_built: Option<i32>,
    pub parking: Option<i32>,
    pub featured: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPayload {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Fully validated create input with defaults applied
#[derive(Debug, Clone)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    pub address: Address,
    pub location: Option<GeoPoint>,
    pub amenities: Vec<String>,
    pub images: Vec<String>,
    pub year_built: Option<i32>,
    pub parking: Option<i32>,
    pub featured: bool,
}

/// Validated partial update: only the provided fields are set
#[derive(Debug, Clone, Default)]
pub struct PropertyUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<f64>,
    pub area: Option<f64>,
    pub address: Option<Address>,
    pub location: Option<GeoPoint>,
    pub amenities: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub year_built: Option<i32>,
    pub parking: Option<i32>,
    pub featured: Option<bool>,
}

impl PropertyPayload {
    pub fn validate_create(&self) -> Result<NewProperty, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = match self.title.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(title) => {
                check_title(title, &mut errors);
                title.to_string()
            }
            None => {
                errors.push(FieldError::new("title", "Please add a title"));
                String::new()
            }
        };

        let description = match self.description.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(description) => {
                check_description(description, &mut errors);
                description.to_string()
            }
            None => {
                errors.push(FieldError::new("description", "Please add a description"));
                String::new()
            }
        };

        let price = match self.price {
            Some(price) => {
                check_price(price, &mut errors);
                price
            }
            None => {
                errors.push(FieldError::new("price", "Please add a price"));
                Decimal::ZERO
            }
        };

        let property_type = match self.property_type.as_deref() {
            Some(raw) => parse_type(raw, &mut errors).unwrap_or(PropertyType::House),
            None => {
                errors.push(FieldError::new("type", "Please add a property type"));
                PropertyType::House
            }
        };

        let status = match self.status.as_deref() {
            Some(raw) => parse_status(raw, &mut errors).unwrap_or_default(),
            None => PropertyStatus::default(),
        };

        check_counts(self, &mut errors);

        let address = match &self.address {
            Some(address) => address.validate(&mut errors),
            None => {
                errors.push(FieldError::new("address", "Please add an address"));
                Address::placeholder()
            }
        };

        let location = check_location(self.location.clone(), &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProperty {
            title,
            description,
            price,
            property_type,
            status,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            area: self.area,
            address,
            location,
            amenities: self.amenities.clone().unwrap_or_default(),
            images: self.images.clone().unwrap_or_default(),
            year_built: self.year_built,
            parking: self.parking,
            featured: self.featured.unwrap_or(false),
        })
    }

    pub fn validate_update(&self) -> Result<PropertyUpdate, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut update = PropertyUpdate::default();

        if let Some(title) = self.title.as_deref().map(str::trim) {
            if title.is_empty() {
                errors.push(FieldError::new("title", "Please add a title"));
            } else {
                check_title(title, &mut errors);
                update.title = Some(title.to_string());
            }
        }

        if let Some(description) = self.description.as_deref() {
            if description.trim().is_empty() {
                errors.push(FieldError::new("description", "Please add a description"));
            } else {
                check_description(description, &mut errors);
                update.description = Some(description.to_string());
            }
        }

        if let Some(price) = self.price {
            check_price(price, &mut errors);
            update.price = Some(price);
        }

        if let Some(raw) = self.property_type.as_deref() {
            update.property_type = parse_type(raw, &mut errors);
        }

        if let Some(raw) = self.status.as_deref() {
            update.status = parse_status(raw, &mut errors);
        }

        check_counts(self, &mut errors);
        update.bedrooms = self.bedrooms;
        update.bathrooms = self.bathrooms;
        update.area = self.area;
        update.parking = self.parking;
        update.year_built = self.year_built;

        // A supplied address replaces the whole object and must be complete
        if let Some(address) = &self.address {
            update.address = Some(address.validate(&mut errors));
        }

        update.location = check_location(self.location.clone(), &mut errors);
        update.amenities = self.amenities.clone();
        update.images = self.images.clone();
        update.featured = self.featured;

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(update)
    }
}

impl Address {
    /// Stand-in value when validation has already failed; never persisted
    fn placeholder() -> Self {
        Address {
            street: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            country: default_country(),
        }
    }
}

impl AddressPayload {
    fn validate(&self, errors: &mut Vec<FieldError>) -> Address {
        let mut require = |value: &Option<String>, field: &'static str, message: &'static str| {
            match value.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(v) => v.to_string(),
                None => {
                    errors.push(FieldError::new(field, message));
                    String::new()
                }
            }
        };

        let street = require(&self.street, "address.street", "Please add a street");
        let city = require(&self.city, "address.city", "Please add a city");
        let state = require(&self.state, "address.state", "Please add a state");
        let zip_code = require(&self.zip_code, "address.zipCode", "Please add a zip code");

        Address {
            street,
            city,
            state,
            zip_code,
            country: self
                .country
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(default_country),
        }
    }
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    if title.chars().count() > MAX_TITLE_LENGTH {
        errors.push(FieldError::new(
            "title",
            format!("Title cannot be more than {} characters", MAX_TITLE_LENGTH),
        ));
    }
}

fn check_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push(FieldError::new(
            "description",
            format!("Description cannot be more than {} characters", MAX_DESCRIPTION_LENGTH),
        ));
    }
}

fn check_price(price: Decimal, errors: &mut Vec<FieldError>) {
    if price < Decimal::ZERO {
        errors.push(FieldError::new("price", "Price cannot be negative"));
    }
}

fn parse_type(raw: &str, errors: &mut Vec<FieldError>) -> Option<PropertyType> {
    match raw.parse::<PropertyType>() {
        Ok(t) => Some(t),
        Err(e) => {
            errors.push(FieldError::new("type", e.to_string()));
            None
        }
    }
}

fn parse_status(raw: &str, errors: &mut Vec<FieldError>) -> Option<PropertyStatus> {
    match raw.parse::<PropertyStatus>() {
        Ok(s) => Some(s),
        Err(e) => {
            errors.push(FieldError::new("status", e.to_string()));
            None
        }
    }
}

fn check_counts(payload: &PropertyPayload, errors: &mut Vec<FieldError>) {
    if payload.bedrooms.is_some_and(|n| n < 0) {
        errors.push(FieldError::new("bedrooms", "Bedrooms cannot be negative"));
    }
    if payload.bathrooms.is_some_and(|n| n < 0.0) {
        errors.push(FieldError::new("bathrooms", "Bathrooms cannot be negative"));
    }
    if payload.area.is_some_and(|n| n < 0.0) {
        errors.push(FieldError::new("area", "Area cannot be negative"));
    }
    if payload.parking.is_some_and(|n| n < 0) {
        errors.push(FieldError::new("parking", "Parking cannot be negative"));
    }
}

fn check_location(location: Option<GeoPoint>, errors: &mut Vec<FieldError>) -> Option<GeoPoint> {
    let point = location?;
    if point.coordinates.len() != 2 {
        errors.push(FieldError::new(
            "location",
            "Location coordinates must be [longitude, latitude]",
        ));
        return None;
    }
    Some(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> PropertyPayload {
        PropertyPayload {
            title: Some("Beautiful Family Home".to_string()),
            description: Some("A beautiful family home in a quiet neighborhood".to_string()),
            price: Some(Decimal::new(350_000, 0)),
            property_type: Some("house".to_string()),
            status: Some("for-sale".to_string()),
            bedrooms: Some(3),
            bathrooms: Some(2.0),
            area: Some(1800.0),
            address: Some(AddressPayload {
                street: Some("123 Main St".to_string()),
                city: Some("Test City".to_string()),
                state: Some("TS".to_string()),
                zip_code: Some("12345".to_string()),
                country: None,
            }),
            location: None,
            amenities: Some(vec!["garden".to_string(), "garage".to_string()]),
            images: Some(vec!["image1.jpg".to_string()]),
            year_built: Some(2010),
            parking: Some(2),
            featured: None,
        }
    }

    #[test]
    fn full_payload_validates_with_defaults() {
        let new = full_payload().validate_create().expect("should validate");
        assert_eq!(new.status, PropertyStatus::ForSale);
        assert_eq!(new.address.country, "USA");
        assert!(!new.featured);
    }

    #[test]
    fn empty_payload_reports_required_fields() {
        let errors = PropertyPayload::default().validate_create().unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Please add a title"));
        assert!(messages.contains(&"Please add a description"));
        assert!(messages.contains(&"Please add a price"));
        assert!(messages.contains(&"Please add a property type"));
        assert!(messages.contains(&"Please add an address"));
    }

    #[test]
    fn negative_price_rejected() {
        let mut payload = full_payload();
        payload.price = Some(Decimal::new(-1, 0));
        let errors = payload.validate_create().unwrap_err();
        assert_eq!(errors[0].message, "Price cannot be negative");
    }

    #[test]
    fn unknown_type_rejected() {
        let mut payload = full_payload();
        payload.property_type = Some("castle".to_string());
        let errors = payload.validate_create().unwrap_err();
        assert_eq!(errors[0].message, "`castle` is not a valid property type");
    }

    #[test]
    fn oversized_title_rejected() {
        let mut payload = full_payload();
        payload.title = Some("x".repeat(MAX_TITLE_LENGTH + 1));
        let errors = payload.validate_create().unwrap_err();
        assert!(errors[0].message.contains("cannot be more than 100"));
    }

    #[test]
    fn partial_update_only_sets_provided_fields() {
        let payload = PropertyPayload {
            title: Some("Updated Property Title".to_string()),
            price: Some(Decimal::new(400_000, 0)),
            ..Default::default()
        };
        let update = payload.validate_update().expect("should validate");
        assert_eq!(update.title.as_deref(), Some("Updated Property Title"));
        assert!(update.description.is_none());
        assert!(update.address.is_none());
    }

    #[test]
    fn update_with_incomplete_address_rejected() {
        let payload = PropertyPayload {
            address: Some(AddressPayload {
                street: Some("456 Oak Ave".to_string()),
                city: None,
                state: None,
                zip_code: None,
                country: None,
            }),
            ..Default::default()
        };
        let errors = payload.validate_update().unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Please add a city"));
        assert!(messages.contains(&"Please add a zip code"));
    }

    #[test]
    fn property_serializes_with_wire_names() {
        let property = Property {
            id: Uuid::new_v4(),
            title: "Loft".to_string(),
            description: "Downtown loft".to_string(),
            price: Decimal::new(250_000, 0),
            property_type: PropertyType::Condo,
            status: PropertyStatus::ForRent,
            bedrooms: Some(1),
            bathrooms: Some(1.0),
            area: None,
            address: Json(Address {
                street: "1 Side St".to_string(),
                city: "Metropolis".to_string(),
                state: "MP".to_string(),
                zip_code: "00001".to_string(),
                country: "USA".to_string(),
            }),
            location: None,
            amenities: vec![],
            images: vec![],
            year_built: Some(1999),
            parking: None,
            user_id: Uuid::new_v4(),
            featured: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&property).unwrap();
        assert!(value.get("_id").is_some());
        assert_eq!(value["type"], "condo");
        assert_eq!(value["status"], "for-rent");
        assert_eq!(value["yearBuilt"], 1999);
        assert_eq!(value["address"]["zipCode"], "00001");
        assert!(value.get("user").is_some());
        assert!(value.get("user_id").is_none());
    }
}
