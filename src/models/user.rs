use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::FieldError;

text_enum!(Role, "role" {
    User => "user",
    Agent => "agent",
    Admin => "admin",
});

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// A registered account. The password hash never leaves the server: it is
/// skipped on serialization everywhere this struct is returned.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of POST /api/auth/register. Everything optional so validation can
/// report all missing fields at once.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

/// Validated registration input, password still in the clear for hashing
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub email: Option<String>,
    pub password: Option<String>,
}

const MIN_PASSWORD_LENGTH: usize = 6;

impl RegisterPayload {
    pub fn validate(&self) -> Result<NewUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match non_empty(&self.name) {
            Some(name) => name,
            None => {
                errors.push(FieldError::new("name", "Please add a name"));
                String::new()
            }
        };

        let email = match non_empty(&self.email) {
            Some(email) => {
                if !is_valid_email(&email) {
                    errors.push(FieldError::new("email", "Please add a valid email"));
                }
                email.to_lowercase()
            }
            None => {
                errors.push(FieldError::new("email", "Please add an email"));
                String::new()
            }
        };

        let password = match non_empty(&self.password) {
            Some(password) => {
                if password.len() < MIN_PASSWORD_LENGTH {
                    errors.push(FieldError::new(
                        "password",
                        format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
                    ));
                }
                password
            }
            None => {
                errors.push(FieldError::new("password", "Please add a password"));
                String::new()
            }
        };

        let role = match self.role.as_deref() {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => role,
                Err(e) => {
                    errors.push(FieldError::new("role", e.to_string()));
                    Role::default()
                }
            },
            None => Role::default(),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewUser {
            name,
            email,
            password,
            phone: non_empty(&self.phone),
            role,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_valid_email(email: &str) -> bool {
    let mut parts = email.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RegisterPayload {
        RegisterPayload {
            name: Some("Test User".to_string()),
            email: Some("test@example.com".to_string()),
            password: Some("password123".to_string()),
            phone: Some("+1234567890".to_string()),
            role: Some("user".to_string()),
        }
    }

    #[test]
    fn valid_payload_passes() {
        let user = payload().validate().expect("should validate");
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn empty_payload_reports_every_missing_field() {
        let empty = RegisterPayload {
            name: None,
            email: None,
            password: None,
            phone: None,
            role: None,
        };
        let errors = empty.validate().unwrap_err();
        let messages: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(messages.contains(&"Please add a name"));
        assert!(messages.contains(&"Please add an email"));
        assert!(messages.contains(&"Please add a password"));
    }

    #[test]
    fn short_password_rejected() {
        let mut p = payload();
        p.password = Some("abc".to_string());
        let errors = p.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("at least 6 characters"));
    }

    #[test]
    fn bad_role_rejected() {
        let mut p = payload();
        p.role = Some("landlord".to_string());
        let errors = p.validate().unwrap_err();
        assert_eq!(errors[0].message, "`landlord` is not a valid role");
    }

    #[test]
    fn email_is_normalized_to_lowercase() {
        let mut p = payload();
        p.email = Some("Mixed@Example.COM".to_string());
        let user = p.validate().expect("should validate");
        assert_eq!(user.email, "mixed@example.com");
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: "t@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            phone: None,
            role: Role::Agent,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], "agent");
        assert!(value.get("_id").is_some());
    }
}
