//! Bucket-name and object-key validation.

/// Validate an S3 bucket name.
///
/// Rules: 3–63 characters; lowercase letters, digits and hyphens only; must
/// start and end with a letter or digit; no `--`; must not look like an
/// IPv4 address.
///
/// # Errors
///
/// Returns a human-readable reason when the name is invalid.
pub fn validate_bucket_name(name: &str) -> Result<(), String> {
    if name.len() < 3 || name.len() > 63 {
        return Err("bucket name must be between 3 and 63 characters".to_owned());
    }

    let bytes = name.as_bytes();
    if !is_lower_alnum(bytes[0]) || !is_lower_alnum(bytes[bytes.len() - 1]) {
        return Err("bucket name must start and end with a lowercase letter or digit".to_owned());
    }

    if !bytes.iter().all(|&b| is_lower_alnum(b) || b == b'-') {
        return Err(
            "bucket name may only contain lowercase letters, digits and hyphens".to_owned(),
        );
    }

    if name.contains("--") {
        return Err("bucket name must not contain consecutive hyphens".to_owned());
    }

    if looks_like_ipv4(name) {
        return Err("bucket name must not be formatted as an IP address".to_owned());
    }

    Ok(())
}

/// Validate an object key: 1..=1024 bytes.
///
/// # Errors
///
/// Returns a human-readable reason when the key is invalid.
pub fn validate_object_key(key: &str) -> Result<(), String> {
    if key.is_empty() {
        return Err("object key must not be empty".to_owned());
    }
    if key.len() > 1024 {
        return Err("object key must not exceed 1024 bytes".to_owned());
    }
    Ok(())
}

fn is_lower_alnum(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit()
}

fn looks_like_ipv4(s: &str) -> bool {
    let octets: Vec<&str> = s.split('.').collect();
    octets.len() == 4
        && octets
            .iter()
            .all(|o| !o.is_empty() && o.len() <= 3 && o.bytes().all(|b| b.is_ascii_digit()))
}
