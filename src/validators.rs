//! Format and checksum validation for customer contact fields.
//!
//! Stateless and reusable. Tax ids come in two national forms: an 11-digit
//! individual id and a 14-digit organization id, both carrying two modulo-11
//! check digits. Formatting characters (dots, dashes, slashes) are stripped
//! before validation.

use regex::Regex;

/// Keep only ASCII digits.
fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Validate email format.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() {
        return false;
    }
    let pattern = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email regex must compile");
    pattern.is_match(email)
}

/// Modulo-11 check digit over `digits` with the given weights.
/// A remainder result of 10 or 11 maps to 0.
fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    let digit = 11 - (sum % 11);
    if digit >= 10 {
        0
    } else {
        digit
    }
}

/// Validate an 11-digit individual tax id.
///
/// Sequences of one repeated digit pass the naive arithmetic but are not
/// issued ids, so they are rejected up front.
pub fn is_valid_individual_tax_id(tax_id: &str) -> bool {
    let clean = digits_only(tax_id);
    if clean.len() != 11 {
        return false;
    }

    let first = clean.as_bytes()[0];
    if clean.bytes().all(|b| b == first) {
        return false;
    }

    let digits: Vec<u32> = clean.chars().filter_map(|c| c.to_digit(10)).collect();

    // First check digit: weights 10..=2 over the first 9 digits
    let weights1: Vec<u32> = (2..=10).rev().collect();
    let digit1 = check_digit(&digits[..9], &weights1);

    // Second check digit: weights 11..=2 over the first 10 digits
    let weights2: Vec<u32> = (2..=11).rev().collect();
    let digit2 = check_digit(&digits[..10], &weights2);

    digits[9] == digit1 && digits[10] == digit2
}

/// Validate a 14-digit organization tax id.
pub fn is_valid_org_tax_id(tax_id: &str) -> bool {
    let clean = digits_only(tax_id);
    if clean.len() != 14 {
        return false;
    }

    let first = clean.as_bytes()[0];
    if clean.bytes().all(|b| b == first) {
        return false;
    }

    let digits: Vec<u32> = clean.chars().filter_map(|c| c.to_digit(10)).collect();

    const WEIGHTS1: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    let digit1 = check_digit(&digits[..12], &WEIGHTS1);

    const WEIGHTS2: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
    let digit2 = check_digit(&digits[..13], &WEIGHTS2);

    digits[12] == digit1 && digits[13] == digit2
}

/// Validate a tax id of either form, auto-selected by digit count.
pub fn is_valid_tax_id(tax_id: &str) -> bool {
    let clean = digits_only(tax_id);
    match clean.len() {
        11 => is_valid_individual_tax_id(&clean),
        14 => is_valid_org_tax_id(&clean),
        _ => false,
    }
}

/// Validate a phone number: 10 digits (landline) or 11 (mobile).
pub fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return false;
    }
    let len = digits_only(phone).len();
    len == 10 || len == 11
}

/// Validate a postal code: exactly 8 digits.
pub fn is_valid_postal_code(postal_code: &str) -> bool {
    if postal_code.is_empty() {
        return false;
    }
    digits_only(postal_code).len() == 8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_common_forms() {
        assert!(is_valid_email("ana.silva@example.com"));
        assert!(is_valid_email("sales+crm@sub.domain.co"));
        assert!(is_valid_email("USER_99%x@host.org"));
    }

    #[test]
    fn test_email_rejects_malformed() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain.c"));
        assert!(!is_valid_email("user name@domain.com"));
    }

    #[test]
    fn test_individual_tax_id_valid() {
        assert!(is_valid_individual_tax_id("52998224725"));
        // Formatting characters are stripped
        assert!(is_valid_individual_tax_id("529.982.247-25"));
    }

    #[test]
    fn test_individual_tax_id_invalid_check_digits() {
        assert!(!is_valid_individual_tax_id("52998224726"));
        assert!(!is_valid_individual_tax_id("52998224735"));
    }

    #[test]
    fn test_individual_tax_id_rejects_repeated_digits() {
        // These pass the naive checksum arithmetic but are not valid ids
        assert!(!is_valid_individual_tax_id("00000000000"));
        assert!(!is_valid_individual_tax_id("11111111111"));
        assert!(!is_valid_individual_tax_id("99999999999"));
    }

    #[test]
    fn test_individual_tax_id_rejects_wrong_length() {
        assert!(!is_valid_individual_tax_id("5299822472"));
        assert!(!is_valid_individual_tax_id("529982247251"));
        assert!(!is_valid_individual_tax_id(""));
    }

    #[test]
    fn test_org_tax_id_valid() {
        assert!(is_valid_org_tax_id("11222333000181"));
        assert!(is_valid_org_tax_id("11.222.333/0001-81"));
    }

    #[test]
    fn test_org_tax_id_invalid() {
        assert!(!is_valid_org_tax_id("11222333000182"));
        assert!(!is_valid_org_tax_id("11111111111111"));
        assert!(!is_valid_org_tax_id("1122233300018"));
    }

    #[test]
    fn test_tax_id_auto_selects_by_length() {
        assert!(is_valid_tax_id("529.982.247-25"));
        assert!(is_valid_tax_id("11.222.333/0001-81"));
        assert!(!is_valid_tax_id("12345"));
        assert!(!is_valid_tax_id(""));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("1187654321"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_postal_code() {
        assert!(is_valid_postal_code("01310-100"));
        assert!(is_valid_postal_code("01310100"));
        assert!(!is_valid_postal_code("0131010"));
        assert!(!is_valid_postal_code(""));
    }
}
