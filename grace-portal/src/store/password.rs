//! Password hashing and verification across the hash formats found in the
//! users table.
//!
//! Rows may carry bcrypt hashes (`$2a$`, `$2b$`, `$2y$`), the
//! `pbkdf2:<digest>:<iterations>$<salt>$<hex>` and
//! `scrypt:<n>:<r>:<p>$<salt>$<hex>` formats written by older Python
//! tooling, or argon2 PHC strings written by this service. Verification
//! fails closed: anything malformed is a mismatch, never an error.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use subtle::ConstantTimeEq;

/// Iteration count assumed when a pbkdf2 method string omits it.
const PBKDF2_DEFAULT_ITERATIONS: u32 = 600_000;

/// Largest scrypt work factor accepted from a stored hash (2^20).
const SCRYPT_MAX_LOG_N: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashScheme {
    Bcrypt,
    Pbkdf2,
    Scrypt,
    Argon2,
    Unknown,
}

impl HashScheme {
    /// Picks the scheme from the stored hash's literal prefix.
    pub fn detect(stored: &str) -> Self {
        if ["$2a$", "$2b$", "$2y$"].iter().any(|p| stored.starts_with(p)) {
            Self::Bcrypt
        } else if stored.starts_with("pbkdf2:") {
            Self::Pbkdf2
        } else if stored.starts_with("scrypt:") {
            Self::Scrypt
        } else if stored.starts_with("$argon2") {
            Self::Argon2
        } else {
            Self::Unknown
        }
    }

    pub fn verify(&self, stored: &str, candidate: &str) -> bool {
        match self {
            Self::Bcrypt => bcrypt::verify(candidate, stored).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "unreadable bcrypt hash");
                false
            }),
            Self::Pbkdf2 => verify_pbkdf2(stored, candidate).unwrap_or(false),
            Self::Scrypt => verify_scrypt(stored, candidate).unwrap_or(false),
            Self::Argon2 => verify_argon2(stored, candidate),
            Self::Unknown => false,
        }
    }
}

/// True only when `candidate` matches `stored`. Empty inputs, unknown
/// schemes and malformed hashes all verify false.
pub fn verify(stored: Option<&str>, candidate: Option<&str>) -> bool {
    let (Some(stored), Some(candidate)) = (stored, candidate) else {
        return false;
    };
    let stored = stored.trim();
    if stored.is_empty() || candidate.is_empty() {
        return false;
    }
    HashScheme::detect(stored).verify(stored, candidate)
}

/// Hashes a new password with the service's own scheme (argon2id).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
}

fn verify_argon2(stored: &str, candidate: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "unreadable argon2 hash");
            false
        }
    }
}

/// Splits `method$salt$hex` into its parts and decodes the digest.
fn split_hash(stored: &str) -> Option<(&str, &str, Vec<u8>)> {
    let mut parts = stored.splitn(3, '$');
    let method = parts.next()?;
    let salt = parts.next()?;
    let digest = hex::decode(parts.next()?).ok()?;
    if digest.is_empty() {
        return None;
    }
    Some((method, salt, digest))
}

fn verify_pbkdf2(stored: &str, candidate: &str) -> Option<bool> {
    use sha2::{Sha256, Sha512};

    let (method, salt, expected) = split_hash(stored)?;
    let mut params = method.strip_prefix("pbkdf2:")?.split(':');
    let digest = params.next()?;
    let iterations = match params.next() {
        Some(n) => n.parse::<u32>().ok().filter(|n| *n > 0)?,
        None => PBKDF2_DEFAULT_ITERATIONS,
    };

    let mut derived = vec![0u8; expected.len()];
    let password = candidate.as_bytes();
    let salt = salt.as_bytes();
    match digest {
        "sha256" => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut derived),
        "sha512" => pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut derived),
        "sha1" => pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, iterations, &mut derived),
        other => {
            tracing::warn!(digest = other, "unsupported pbkdf2 digest");
            return None;
        }
    }

    Some(derived.ct_eq(&expected).into())
}

fn verify_scrypt(stored: &str, candidate: &str) -> Option<bool> {
    let (method, salt, expected) = split_hash(stored)?;
    let mut params = method.strip_prefix("scrypt:")?.split(':');
    let n: u64 = params.next()?.parse().ok()?;
    let r: u32 = params.next()?.parse().ok()?;
    let p: u32 = params.next()?.parse().ok()?;

    if n < 2 || !n.is_power_of_two() {
        return None;
    }
    let log_n = u8::try_from(n.trailing_zeros()).ok()?;
    if log_n > SCRYPT_MAX_LOG_N {
        tracing::warn!(log_n, "scrypt work factor above limit");
        return None;
    }

    let params = scrypt::Params::new(log_n, r, p, expected.len()).ok()?;
    let mut derived = vec![0u8; expected.len()];
    scrypt::scrypt(candidate.as_bytes(), salt.as_bytes(), &params, &mut derived).ok()?;

    Some(derived.ct_eq(&expected).into())
}
