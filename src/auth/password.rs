//! PBKDF2-SHA256 password hashing.
//!
//! Stored format: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`. The
//! iteration count travels with the hash so it can be raised later without
//! invalidating existing passwords.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const OUTPUT_LEN: usize = 32;
const TEMP_PASSWORD_ALPHABET: &[u8] = b"abcdefghijkmnopqrstuvwxyz23456789";

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Random number generator failed: {0}")]
    Random(String),
    #[error("Iteration count must be greater than zero")]
    ZeroIterations,
}

pub fn random_bytes(len: usize) -> Result<Vec<u8>, PasswordError> {
    let mut out = vec![0u8; len];
    getrandom::fill(&mut out).map_err(|e| PasswordError::Random(e.to_string()))?;
    Ok(out)
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; OUTPUT_LEN] {
    let mut out = [0u8; OUTPUT_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> Result<String, PasswordError> {
    if iterations == 0 {
        return Err(PasswordError::ZeroIterations);
    }
    let salt = random_bytes(SALT_LEN)?;
    let hash = derive(password, &salt, iterations);
    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        hex::encode(salt),
        hex::encode(hash)
    ))
}

/// Check a password against a stored hash. Unparseable hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(SCHEME), Some(iterations), Some(salt), Some(expected), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Some(salt), Some(expected)) = (hex::decode(salt).ok(), hex::decode(expected).ok()) else {
        return false;
    };
    if iterations == 0 || expected.len() != OUTPUT_LEN {
        return false;
    }

    let derived = derive(password, &salt, iterations);
    derived.as_slice().ct_eq(expected.as_slice()).into()
}

/// Generate a temporary password for bulk-registered volunteers: eight random
/// characters followed by `A1!` so it satisfies common complexity rules.
pub fn temporary_password() -> Result<String, PasswordError> {
    let bytes = random_bytes(8)?;
    let mut out: String = bytes
        .iter()
        .map(|b| TEMP_PASSWORD_ALPHABET[*b as usize % TEMP_PASSWORD_ALPHABET.len()] as char)
        .collect();
    out.push_str("A1!");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse", 1_000).unwrap();
        assert!(hash.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = hash_password("secret123", 1_000).unwrap();
        let b = hash_password("secret123", 1_000).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("secret123", &a));
        assert!(verify_password("secret123", &b));
    }

    #[test]
    fn test_garbage_hashes_never_match() {
        for stored in ["", "plain", "bcrypt$10$abc$def", "pbkdf2-sha256$x$00$00", "pbkdf2-sha256$10$zz$00"] {
            assert!(!verify_password("anything", stored));
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(matches!(hash_password("pw", 0), Err(PasswordError::ZeroIterations)));
    }

    #[test]
    fn test_temporary_password_shape() {
        let pw = temporary_password().unwrap();
        assert_eq!(pw.len(), 11);
        assert!(pw.ends_with("A1!"));
    }

    #[test]
    fn test_stored_hash_is_hex_encoded() {
        let hash = hash_password("secret123", 1_000).unwrap();
        let parts: Vec<&str> = hash.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(hex::decode(parts[2]).unwrap().len(), SALT_LEN);
        assert_eq!(hex::decode(parts[3]).unwrap().len(), OUTPUT_LEN);
    }
}
