/// Password hashing and verification using Argon2id
///
/// - Algorithm: Argon2id (memory-hard, resistant to GPU attacks)
/// - Work factor: time cost (iterations) from configuration
/// - Memory and parallelism from configuration
/// - Salt: 16 bytes random, embedded in the PHC string
/// - Output: 32 bytes hash
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use hrm_core::AuthConfig;
use thiserror::Error;

/// Password hashing and verification errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password exceeds {max} bytes")]
    TooLong { max: usize },

    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

/// Password hashing configuration
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 65536 = 64 MB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism (lanes, default: 4)
    pub parallelism: u32,
    /// Output length in bytes (default: 32)
    pub output_len: Option<usize>,
    /// Longest accepted plaintext in bytes
    pub max_password_bytes: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for PasswordConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            memory_cost: config.hash_memory_kib,
            time_cost: config.hash_time_cost,
            parallelism: config.hash_parallelism,
            output_len: Some(32),
            max_password_bytes: config.max_password_bytes,
        }
    }
}

impl PasswordConfig {
    /// Create Argon2 parameters from this configuration
    fn to_params(&self) -> Result<Params, PasswordError> {
        Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            self.output_len,
        )
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }
}

/// Hash a plaintext password using Argon2id
///
/// Returns a PHC string (algorithm, parameters, salt and hash), safe to store
/// as is. Fails with [`PasswordError::TooLong`] when the plaintext is longer
/// than `config.max_password_bytes`.
///
/// # Example
///
/// ```no_run
/// use hrm_api::auth::password::{hash_password, PasswordConfig};
///
/// let hash = hash_password("secret123", &PasswordConfig::default()).unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str, config: &PasswordConfig) -> Result<String, PasswordError> {
    if password.len() > config.max_password_bytes {
        return Err(PasswordError::TooLong {
            max: config.max_password_bytes,
        });
    }

    let salt = SaltString::generate(&mut OsRng);

    let params = config.to_params()?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a plaintext password against a stored hash
///
/// * `Ok(true)` - Password matches
/// * `Ok(false)` - Password does not match
/// * `Err(PasswordError)` - The stored hash is unusable
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters are read back from the PHC string
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

#[cfg(test)]
pub(crate) fn fast_config() -> PasswordConfig {
    PasswordConfig {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        output_len: Some(32),
        max_password_bytes: 64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let config = fast_config();
        let hash = hash_password("secret123", &config).expect("Failed to hash password");

        assert!(verify_password("secret123", &hash).expect("Verification failed"));
        assert!(!verify_password("secret124", &hash).expect("Verification failed"));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("plaintext-marker", &fast_config()).unwrap();
        assert!(!hash.contains("plaintext-marker"));
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_produces_different_hashes() {
        // Random salt per hash
        let config = fast_config();
        let hash1 = hash_password("SamePassword123!", &config).unwrap();
        let hash2 = hash_password("SamePassword123!", &config).unwrap();

        assert_ne!(hash1, hash2);
        assert!(verify_password("SamePassword123!", &hash1).unwrap());
        assert!(verify_password("SamePassword123!", &hash2).unwrap());
    }

    #[test]
    fn test_password_too_long() {
        let config = fast_config();
        let at_limit = "a".repeat(config.max_password_bytes);
        let over_limit = "a".repeat(config.max_password_bytes + 1);

        assert!(hash_password(&at_limit, &config).is_ok());
        assert!(matches!(
            hash_password(&over_limit, &config),
            Err(PasswordError::TooLong { max: 64 })
        ));
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "invalid-hash-format");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_work_factor_is_encoded() {
        let config = PasswordConfig {
            time_cost: 2,
            ..fast_config()
        };

        let hash = hash_password("TestPassword123!", &config).unwrap();

        assert!(verify_password("TestPassword123!", &hash).unwrap());
        assert!(hash.contains("m=1024"));
        assert!(hash.contains("t=2"));
        assert!(hash.contains("p=1"));
    }

    #[test]
    fn test_invalid_params() {
        let config = PasswordConfig {
            time_cost: 0,
            ..fast_config()
        };
        assert!(matches!(
            hash_password("secret", &config),
            Err(PasswordError::HashingFailed(_))
        ));
    }
}
