//! Short alphanumeric codes identifying records to humans.
//!
//! Movements, apportionments, launches and refuelings each carry a
//! six-character code that is shown on screens and receipts.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Length of codes generated for financial records.
pub const CODE_LENGTH: usize = 6;

/// Generates a random upper-case alphanumeric code of the given length.
#[must_use]
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_length_and_charset() {
        let code = generate_code(CODE_LENGTH);
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_zero_length() {
        assert!(generate_code(0).is_empty());
    }
}
