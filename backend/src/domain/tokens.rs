//! Random tokens: booking counter-marks, validation links, password resets.

use rand::Rng;
use rand::distributions::{Alphanumeric, Slice};

const BOOKING_TOKEN_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

/// Length of a booking counter-mark.
pub const BOOKING_TOKEN_LENGTH: usize = 6;

/// Length of validation and reset tokens.
pub const LINK_TOKEN_LENGTH: usize = 27;

/// Six upper-case alphanumeric characters identifying a booking.
///
/// # Examples
/// ```
/// let token = backend::domain::tokens::random_booking_token();
/// assert_eq!(token.len(), 6);
/// assert!(token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
/// ```
pub fn random_booking_token() -> String {
    let Ok(alphabet) = Slice::new(BOOKING_TOKEN_ALPHABET) else {
        return String::new();
    };
    rand::thread_rng()
        .sample_iter(alphabet)
        .take(BOOKING_TOKEN_LENGTH)
        .collect()
}

/// Opaque token embedded in validation and password reset links.
pub fn random_link_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(LINK_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Whether `token` has the shape of a booking counter-mark.
pub fn is_booking_token(token: &str) -> bool {
    token.len() == BOOKING_TOKEN_LENGTH
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_tokens_have_the_expected_shape() {
        for _ in 0..64 {
            assert!(is_booking_token(&random_booking_token()));
        }
    }

    #[test]
    fn link_tokens_are_long_and_distinct() {
        let a = random_link_token();
        let b = random_link_token();
        assert_eq!(a.len(), LINK_TOKEN_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn lower_case_is_not_a_booking_token() {
        assert!(!is_booking_token("abc123"));
        assert!(!is_booking_token("ABC12"));
    }
}
