//! Credential material: access/secret key generation and password hashing.

use rand::Rng;

/// Total length of a generated access key, `AKIA` prefix included.
pub const ACCESS_KEY_LEN: usize = 20;
/// Length of a generated secret key.
pub const SECRET_KEY_LEN: usize = 40;

/// Alphabet for the access-key suffix (AWS keys are uppercase alphanumeric).
const ACCESS_KEY_CHARS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '2', '3', '4', '5', '6', '7',
];

/// Alphabet for secret keys.
const SECRET_KEY_CHARS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l',
    'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2', '3', '4',
    '5', '6', '7', '8', '9',
];

/// Generate an AWS-shaped access key: `AKIA` followed by 16 random
/// uppercase characters.
#[must_use]
pub fn generate_access_key() -> String {
    let mut key = String::with_capacity(ACCESS_KEY_LEN);
    key.push_str("AKIA");
    let mut rng = rand::thread_rng();
    key.extend(
        (0..ACCESS_KEY_LEN - 4).map(|_| ACCESS_KEY_CHARS[rng.gen_range(0..ACCESS_KEY_CHARS.len())]),
    );
    key
}

/// Generate a 40-character secret key.
#[must_use]
pub fn generate_secret_key() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_KEY_LEN)
        .map(|_| SECRET_KEY_CHARS[rng.gen_range(0..SECRET_KEY_CHARS.len())])
        .collect()
}

/// Generate a fresh access/secret key pair.
#[must_use]
pub fn generate_credentials() -> (String, String) {
    (generate_access_key(), generate_secret_key())
}

/// Hash a password with bcrypt at the default cost.
///
/// # Errors
///
/// Returns [`bcrypt::BcryptError`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// Check a password against a stored bcrypt hash. Any verification failure
/// counts as a non-match.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
