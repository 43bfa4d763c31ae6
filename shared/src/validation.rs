//! Validation utilities for the jewelry admin platform
//!
//! Includes the India-specific formats required by the logistics carrier.

// ============================================================================
// Shipment Validations
// ============================================================================

/// Number of digits in an Indian postal code (PIN)
pub const POSTAL_CODE_LEN: usize = 6;

/// Number of digits in a carrier docket number
pub const DOCKET_NUMBER_LEN: usize = 10;

/// Minimum digits in a contact phone number
pub const MIN_PHONE_DIGITS: usize = 10;

fn is_ascii_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

/// Validate a postal code: exactly 6 ASCII digits
pub fn validate_postal_code(code: &str) -> Result<(), &'static str> {
    if is_ascii_digits(code, POSTAL_CODE_LEN) {
        Ok(())
    } else {
        Err("Postal code must be exactly 6 digits")
    }
}

/// Validate a docket number: exactly 10 ASCII digits
pub fn validate_docket_number(docket: &str) -> Result<(), &'static str> {
    if is_ascii_digits(docket, DOCKET_NUMBER_LEN) {
        Ok(())
    } else {
        Err("Docket number must be exactly 10 digits")
    }
}

/// All entries of `dockets` that are not valid docket numbers, in order
pub fn find_invalid_dockets<S: AsRef<str>>(dockets: &[S]) -> Vec<&str> {
    dockets
        .iter()
        .map(AsRef::as_ref)
        .filter(|d| validate_docket_number(d).is_err())
        .collect()
}

/// Digits of a phone number, with separators and `+` removed
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate a contact phone: at least 10 digits once separators are removed
pub fn validate_contact_phone(phone: &str) -> Result<(), &'static str> {
    if phone_digits(phone).len() >= MIN_PHONE_DIGITS {
        Ok(())
    } else {
        Err("Phone number must contain at least 10 digits")
    }
}

/// Last 10 digits of a phone number (drops a country code prefix)
pub fn national_phone_number(phone: &str) -> String {
    let digits = phone_digits(phone);
    let skip = digits.len().saturating_sub(MIN_PHONE_DIGITS);
    digits[skip..].to_string()
}

/// Truncate to at most `max_chars` characters, on a char boundary
pub fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a currency code (3 uppercase letters)
pub fn validate_currency(code: &str) -> Result<(), &'static str> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err("Currency must be a 3-letter uppercase code")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Shipment Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_postal_code_valid() {
        assert!(validate_postal_code("400001").is_ok());
        assert!(validate_postal_code("110011").is_ok());
    }

    #[test]
    fn test_validate_postal_code_invalid() {
        assert!(validate_postal_code("40001").is_err());
        assert!(validate_postal_code("4000011").is_err());
        assert!(validate_postal_code("40000A").is_err());
        assert!(validate_postal_code("").is_err());
        assert!(validate_postal_code("४००००१").is_err());
    }

    #[test]
    fn test_validate_docket_number() {
        assert!(validate_docket_number("1234567890").is_ok());
        assert!(validate_docket_number("123").is_err());
        assert!(validate_docket_number("12345678901").is_err());
        assert!(validate_docket_number("12345 7890").is_err());
    }

    #[test]
    fn test_find_invalid_dockets_reports_all() {
        let dockets = vec!["1234567890", "123", "abcdefghij", "0987654321"];
        assert_eq!(find_invalid_dockets(&dockets), vec!["123", "abcdefghij"]);
        assert!(find_invalid_dockets(&["1111111111"]).is_empty());
    }

    #[test]
    fn test_phone_digits() {
        assert_eq!(phone_digits("+91 98765-43210"), "919876543210");
        assert!(validate_contact_phone("+91 98765-43210").is_ok());
        assert!(validate_contact_phone("98765 4321").is_err());
    }

    #[test]
    fn test_national_phone_number() {
        assert_eq!(national_phone_number("+91 98765-43210"), "9876543210");
        assert_eq!(national_phone_number("9876543210"), "9876543210");
        assert_eq!(national_phone_number("12345"), "12345");
    }

    #[test]
    fn test_truncate_chars() {
        let long = "a".repeat(60);
        assert_eq!(truncate_chars(&long, 50).len(), 50);
        assert_eq!(truncate_chars("  Flat 4B  ", 50), "Flat 4B");
        assert_eq!(truncate_chars("मुंबई", 3).chars().count(), 3);
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("INR").is_ok());
        assert!(validate_currency("inr").is_err());
        assert!(validate_currency("RUPEE").is_err());
    }
}
