//! Phone-number normalization

/// Normalize a phone number to `+<digits>`.
///
/// Every character that is not an ASCII digit is dropped and a single `+` is
/// prefixed. No validation happens here; the provider rejects malformed
/// numbers.
pub fn normalize_phone_number(input: &str) -> String {
    let mut normalized = String::with_capacity(input.len() + 1);
    normalized.push('+');
    normalized.extend(input.chars().filter(char::is_ascii_digit));
    normalized
}
