//! League settings bounds and invite codes.

use rand::Rng;

/// Default submission window in days.
pub const DEFAULT_SUBMISSION_DAYS: i32 = 7;
/// Default voting window in days.
pub const DEFAULT_VOTING_DAYS: i32 = 2;
/// Default number of ranked votes each member may cast per prompt.
pub const DEFAULT_VOTES_PER_PLAYER: i32 = 3;

pub const MAX_SUBMISSION_DAYS: i32 = 30;
pub const MAX_VOTING_DAYS: i32 = 14;
pub const MAX_VOTES_PER_PLAYER: i32 = 10;

/// Length of generated invite codes.
pub const INVITE_CODE_LEN: usize = 8;

/// Unambiguous uppercase alphabet (no `0/O`, `1/I`).
const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate a random invite code.
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.random_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize user-typed invite codes (surrounding whitespace, case).
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invite_code_has_expected_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.bytes().all(|b| INVITE_ALPHABET.contains(&b)));
    }

    #[test]
    fn invite_codes_differ() {
        assert_ne!(generate_invite_code(), generate_invite_code());
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(normalize_invite_code("  abcd2345 \n"), "ABCD2345");
    }
}
