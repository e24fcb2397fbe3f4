//! Room codes.
//!
//! Rooms are identified by short codes that people read aloud and type by
//! hand, so characters that are easy to confuse (`O`/`0`, `I`/`1`/`L`) are
//! never used.

use rand::Rng;

/// Length of a room code.
pub const ROOM_CODE_LENGTH: usize = 7;

/// Characters a room code is drawn from.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generate a random room code.
pub fn generate_room_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether a string has the shape of a room code.
pub fn is_valid_room_code(code: &str) -> bool {
    code.len() == ROOM_CODE_LENGTH && code.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
}
