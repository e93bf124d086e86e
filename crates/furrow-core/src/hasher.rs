use sha2::{Digest, Sha256};

/// SHA-256 of the password, lower-case hex. Unsalted: equal passwords give
/// equal digests across accounts.
pub fn hash_password(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}
