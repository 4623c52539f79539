// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

/// DTO for signing in.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please enter both email and password."))]
    pub email: String,
    #[validate(length(min = 1, message = "Please enter both email and password."))]
    pub password: String,
}

/// DTO for creating an account (Registration).
/// `confirm` never leaves the client.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, message = "All fields required."))]
    pub email: String,
    #[validate(length(min = 1, message = "All fields required."))]
    pub username: String,
    #[validate(length(min = 1, message = "All fields required."))]
    pub password: String,
    #[serde(skip)]
    #[validate(must_match(other = "password", message = "Passwords must match."))]
    pub confirm: String,
}

/// Response of both auth endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: AuthUser,
}

#[derive(Debug, Deserialize)]
pub struct AuthUser {
    pub token: String,
}

/// Picks the user-facing message of the first failing field, in form order.
pub fn first_message(errors: &ValidationErrors, field_order: &[&str]) -> Option<String> {
    let fields = errors.field_errors();
    field_order.iter().find_map(|name| {
        fields
            .get(*name)
            .and_then(|errs| errs.first())
            .and_then(|err| err.message.as_ref())
            .map(|msg| msg.to_string())
    })
}

impl LoginForm {
    pub const FIELDS: [&'static str; 2] = ["email", "password"];

    /// Checks the form locally and returns the message to show on failure.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| {
            first_message(&errors, &Self::FIELDS).unwrap_or_else(|| errors.to_string())
        })
    }
}

impl SignUpForm {
    // Required fields first so "All fields required." wins over a mismatch.
    pub const FIELDS: [&'static str; 4] = ["email", "username", "password", "confirm"];

    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| {
            first_message(&errors, &Self::FIELDS).unwrap_or_else(|| errors.to_string())
        })
    }
}
