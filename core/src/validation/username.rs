use std::sync::LazyLock;

use regex::Regex;

use super::ValidationResult;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 25;

static VALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("username pattern is valid"));

/// Length and character-set checks are independent; both may fail.
pub fn validate_username(username: &str) -> ValidationResult {
    let mut errors = Vec::new();

    let length = username.chars().count();
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        errors.push(format!(
            "Username must be between {MIN_LENGTH} and {MAX_LENGTH} characters long."
        ));
    }
    if !VALID_CHARS.is_match(username) {
        errors.push("Username can only contain letters, numbers, and underscores.".to_string());
    }

    ValidationResult::from_errors(errors)
}
