use std::sync::LazyLock;

use regex::Regex;

use super::ValidationResult;

const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 6;

static VALID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("invite code pattern is valid"));

pub fn validate_invite_code(code: &str) -> ValidationResult {
    let mut errors = Vec::new();

    let length = code.chars().count();
    if length < MIN_LENGTH {
        errors.push(format!(
            "Invite code must be at least {MIN_LENGTH} character long."
        ));
    }
    if length > MAX_LENGTH {
        errors.push(format!(
            "Invite code must be at most {MAX_LENGTH} characters long."
        ));
    }
    if !VALID_CHARS.is_match(code) {
        errors.push("Invite code can only contain letters and numbers.".to_string());
    }

    ValidationResult::from_errors(errors)
}
