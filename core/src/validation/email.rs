use std::sync::LazyLock;

use regex::Regex;

use super::ValidationResult;

const MAX_LENGTH: usize = 254;

static EMAIL_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Misspelled domains and the domain the user most likely meant.
const DOMAIN_TYPOS: &[(&str, &str)] = &[
    ("gmial.com", "gmail.com"),
    ("gmai.com", "gmail.com"),
    ("yahooo.com", "yahoo.com"),
    ("hotmial.com", "hotmail.com"),
];

/// Check an email address.
///
/// A known domain typo produces a "Did you mean" message and makes the
/// result invalid even when the address is well-formed.
pub fn validate_email(email: &str) -> ValidationResult {
    if email.is_empty() {
        return ValidationResult::from_errors(vec!["Email is required".to_string()]);
    }

    let mut errors = Vec::new();

    if email.chars().count() > MAX_LENGTH {
        errors.push("Email address is too long".to_string());
    }
    if !EMAIL_FORMAT.is_match(email) {
        errors.push("Please enter a valid email address".to_string());
    }
    if let Some(suggestion) = suggest_correction(email) {
        errors.push(format!("Did you mean {suggestion}?"));
    }

    ValidationResult::from_errors(errors)
}

/// The address with its domain corrected, if the domain is a known typo.
fn suggest_correction(email: &str) -> Option<String> {
    let domain = email.split('@').nth(1).filter(|d| !d.is_empty())?;
    let lowered = domain.to_ascii_lowercase();
    let (_, corrected) = DOMAIN_TYPOS.iter().find(|(typo, _)| *typo == lowered)?;
    Some(email.replacen(domain, corrected, 1))
}
