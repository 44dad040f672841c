use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;
use crate::services::credentials::NewUser;

/// Request body for `POST /api/auth/register`.
///
/// Missing fields deserialize as empty strings so they are reported as
/// field-level validation errors rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    /// Validate and normalize (trimmed username, trimmed lower-case email).
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let username = self.username.trim().to_string();
        let email = normalize_email(&self.email);
        let mut errors = Vec::new();

        if username.chars().count() < 3 {
            errors.push(FieldError {
                field: "username",
                message: "must be at least 3 characters",
            });
        }
        if !is_email(&email) {
            errors.push(FieldError {
                field: "email",
                message: "must be a valid email address",
            });
        }
        if self.password.chars().count() < 6 {
            errors.push(FieldError {
                field: "password",
                message: "must be at least 6 characters",
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewUser {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// Structural check only: one '@', non-empty local part, dotted domain, no whitespace.
fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}
