//! Hashing and randomness shared by the credential services.

use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, Rng, RngCore};
use sha2::{Digest, Sha256};

/// SHA-256 of `input`, lowercase hex
pub fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// `bytes` bytes from the OS CSPRNG, hex encoded
pub fn random_token_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Zero-padded numeric code of `digits` digits from the OS CSPRNG
pub fn random_numeric_code(digits: u32) -> String {
    let upper = 10u64.pow(digits.clamp(4, 10));
    let value = OsRng.gen_range(0..upper);
    format!("{:0width$}", value, width = digits.clamp(4, 10) as usize)
}

/// Constant-time comparison of two stored hashes
pub fn hashes_match(left: &str, right: &str) -> bool {
    constant_time_eq(left.as_bytes(), right.as_bytes())
}
