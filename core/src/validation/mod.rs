//! Pure validators for user-supplied form fields.
//!
//! Each validator runs all of its checks and reports every failure, in the
//! order the checks run, as human-readable messages. Validation never errors:
//! problems are returned as data so forms can render them inline.
//!
//! Lengths are counted in Unicode scalar values.

mod email;
mod invite_code;
mod password;
mod username;

use serde::Serialize;

pub use email::validate_email;
pub use invite_code::validate_invite_code;
pub use password::validate_password;
pub use username::validate_username;

/// Outcome of validating a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
}

impl ValidationResult {
    /// The result is valid exactly when `errors` is empty.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

/// A form field with a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Password,
    Username,
    Email,
    InviteCode,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Password => "Password",
            Field::Username => "Username",
            Field::Email => "Email",
            Field::InviteCode => "Invite code",
        }
    }
}

/// Validate `input` with the rules for `field`.
pub fn validate(field: Field, input: &str) -> ValidationResult {
    match field {
        Field::Password => validate_password(input),
        Field::Username => validate_username(input),
        Field::Email => validate_email(input),
        Field::InviteCode => validate_invite_code(input),
    }
}
