// Opaque identifier generation: random entity ids, email-derived user ids.
use crate::core::error::{Error, ErrorKind};
use getrandom::fill as fill_random;
use sha2::{Digest, Sha256};

const ID_LEN: usize = 9;
const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate an id for a book, request, or notification.
///
/// Nine lowercase base-36 characters, matching the width the persisted
/// snapshots have always used. Uniqueness is probabilistic; ids are opaque
/// and never parsed.
pub fn new_entity_id() -> Result<String, Error> {
    let mut bytes = [0u8; ID_LEN];
    fill_random(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal).with_message(format!("failed to generate id: {err}"))
    })?;
    Ok(encode_base36(&bytes))
}

/// Derive the stable user id for an email address.
///
/// Identity here is mock: there is no account store, so the id must fall out
/// of the email alone for a repeat login to land on the same user. Case and
/// surrounding whitespace are ignored.
pub fn user_id_for_email(email: &str) -> String {
    let normalized = email.trim().to_ascii_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    encode_base36(&digest[..ID_LEN])
}

fn encode_base36(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for byte in bytes {
        out.push(char::from(ALPHABET[usize::from(*byte) % ALPHABET.len()]));
    }
    out
}
