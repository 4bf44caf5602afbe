//! Luhn arithmetic for debit references.
//!
//! References are random digit strings with a trailing Luhn check digit.
//! Everything here works on digit slices rather than integers so that
//! leading zeros survive.

use rand::Rng;

/// Standard Luhn checksum over a digit sequence: digits at odd positions
/// (from the right, 1-indexed) count unchanged, digits at even positions
/// are doubled and digit-summed, result is the total mod 10.
pub fn luhn_checksum(digits: &[u8]) -> u8 {
    let mut total: u32 = 0;
    for (i, &digit) in digits.iter().rev().enumerate() {
        if i % 2 == 0 {
            total += u32::from(digit);
        } else {
            let doubled = digit * 2;
            total += u32::from(doubled / 10 + doubled % 10);
        }
    }
    (total % 10) as u8
}

/// Check digit that makes `partial` followed by it Luhn-valid. Computed
/// over `partial` with a trailing placeholder of 0.
pub fn calculate_luhn(partial: &[u8]) -> u8 {
    let mut padded = partial.to_vec();
    padded.push(0);
    let checksum = luhn_checksum(&padded);
    if checksum == 0 { 0 } else { 10 - checksum }
}

/// Draws a random reference candidate: `length - 1` uniform decimal digits
/// (the leading digit may be zero) plus the Luhn check digit.
pub fn random_reference(rng: &mut impl Rng, length: usize) -> String {
    let digits: Vec<u8> = (0..length - 1).map(|_| rng.gen_range(0..=9)).collect();
    let check = calculate_luhn(&digits);

    let mut out = String::with_capacity(length);
    for d in digits.iter().chain(std::iter::once(&check)) {
        out.push(char::from(b'0' + d));
    }
    out
}

/// True when the final digit is a valid Luhn check digit for the rest.
pub fn is_luhn_valid(reference: &str) -> bool {
    let Some(digits) = to_digits(reference) else {
        return false;
    };
    !digits.is_empty() && luhn_checksum(&digits) == 0
}

fn to_digits(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}
