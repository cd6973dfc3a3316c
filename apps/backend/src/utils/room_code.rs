//! Room code generation.
//!
//! Room codes are 8 uppercase ASCII letters, short enough to read out loud
//! and type on a phone.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const ROOM_CODE_LEN: usize = 8;

/// Generate a random room code.
///
/// Uniqueness is not guaranteed here; callers check for collisions against
/// the live room table and draw again.
///
/// # Example
/// ```
/// use fgame::utils::room_code::generate_room_code;
///
/// let code = generate_room_code();
/// assert_eq!(code.len(), 8);
/// assert!(code.bytes().all(|b| b.is_ascii_uppercase()));
/// ```
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
