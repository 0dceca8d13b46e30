//! Email and password validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum password length accepted at registration and reset
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Maximum password length accepted at registration and reset
pub const PASSWORD_MAX_LENGTH: usize = 64;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Deliberately permissive: one '@', no whitespace, a dot in the domain.
    // Deliverability is proven by the confirmation email, not the regex.
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
});

/// Normalize an email address for storage and lookups (trim + lowercase)
///
/// Account emails are unique on their normalized form; every lookup and
/// comparison must go through this function first.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check if an email address is plausibly valid
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email.trim())
}

/// Check if a password length is within the accepted bounds
pub fn is_valid_password_length(password: &str) -> bool {
    let len = password.chars().count();
    (PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len)
}

/// Check if a password contains the required character classes
/// (at least one lowercase letter, one uppercase letter, and one digit)
pub fn has_required_character_classes(password: &str) -> bool {
    password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
        assert_eq!(normalize_email("owner@taller.mx"), "owner@taller.mx");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email(" ana@example.com "));
        assert!(!is_valid_email("ana@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(!is_valid_password_length("Short1"));
        assert!(is_valid_password_length("Password1"));
        assert!(is_valid_password_length(&"a".repeat(64)));
        assert!(!is_valid_password_length(&"a".repeat(65)));
    }

    #[test]
    fn test_character_classes() {
        assert!(has_required_character_classes("Password1"));
        assert!(!has_required_character_classes("password1"));
        assert!(!has_required_character_classes("PASSWORD1"));
        assert!(!has_required_character_classes("Passwords"));
    }
}
