//! Phone number utilities

/// Strip common formatting characters, keeping digits and a leading `+`
pub fn strip_formatting(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Normalise a phone number to E.164 (`+` followed by 8 to 15 digits,
/// no leading zero in the country code). Returns `None` when the input
/// cannot be interpreted as an international number.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let stripped = strip_formatting(phone.trim());
    let digits = stripped.strip_prefix('+')?;
    if digits.contains('+') || !(8..=15).contains(&digits.len()) || digits.starts_with('0') {
        return None;
    }
    Some(stripped)
}

/// Check if a phone number is a valid E.164 number
pub fn is_valid_phone(phone: &str) -> bool {
    normalize_phone(phone).is_some()
}

/// Mask a phone number for logs (e.g., +15****4567)
pub fn mask_phone(phone: &str) -> String {
    let normalized = strip_formatting(phone);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 4..]
        )
    } else {
        "****".to_string()
    }
}
