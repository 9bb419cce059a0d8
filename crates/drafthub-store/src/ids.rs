// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque identifier/token generation (spec.md §3): a 22-char session id and
//! 20-char per-side player tokens, drawn from an alphanumeric alphabet.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

fn random_opaque_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// A fresh session identifier, assigned once at creation.
pub fn new_session_id() -> String {
    random_opaque_string(22)
}

/// A fresh per-side authentication token, minted once and never rotated.
pub fn new_side_token() -> String {
    random_opaque_string(20)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_has_the_spec_length() {
        assert_eq!(new_session_id().len(), 22);
    }

    #[test]
    fn side_token_has_the_spec_length() {
        assert_eq!(new_side_token().len(), 20);
    }

    #[test]
    fn generated_values_are_alphanumeric() {
        assert!(new_session_id().chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(new_side_token().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn two_calls_are_very_unlikely_to_collide() {
        assert_ne!(new_session_id(), new_session_id());
    }
}
