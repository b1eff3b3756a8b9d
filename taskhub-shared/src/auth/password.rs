/// Password hashing using Argon2id
///
/// Passwords are stored only as Argon2id PHC strings, never in plaintext.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery")?;
/// assert!(verify_password("correct horse battery", &hash)?);
/// assert!(!verify_password("wrong guess", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Minimum accepted password length (pre-hash, after trimming)
pub const MIN_PASSWORD_LENGTH: usize = 7;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hashes a password using Argon2id with secure parameters
///
/// # Returns
///
/// PHC string format hash (includes algorithm, parameters, salt, and hash),
/// e.g. `$argon2id$v=19$m=65536,t=3,p=4$...$...`
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash`/`VerifyError` if the stored hash is
/// not a parseable PHC string or verification fails for another reason.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!(
            "Verification failed: {}",
            e
        ))),
    }
}

/// Validates a plaintext password against the signup policy
///
/// Rules (applied to the trimmed password):
/// - at least [`MIN_PASSWORD_LENGTH`] characters
/// - must not contain the substring "password" in any casing
///
/// # Returns
///
/// `Ok(())` if acceptable, `Err` with a user-facing message if not
///
/// # Example
///
/// ```
/// use taskhub_shared::auth::password::validate_password_policy;
///
/// assert!(validate_password_policy("sunny day").is_ok());
/// assert!(validate_password_policy("short").is_err());
/// assert!(validate_password_policy("myPassword123").is_err());
/// ```
pub fn validate_password_policy(password: &str) -> Result<(), String> {
    let password = password.trim();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.to_lowercase().contains("password") {
        return Err("word 'password' shouldn't be used".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("test_secret_123").expect("hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_secret").expect("hash 1 should succeed");
        let hash2 = hash_password("same_secret").expect("hash 2 should succeed");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("correct_secret").unwrap();
        assert!(verify_password("correct_secret", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("correct_secret").unwrap();
        assert!(!verify_password("wrong_secret", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("secret", "invalid_hash").is_err());
        assert!(verify_password("secret", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_hash_never_equals_plaintext() {
        let plaintext = "plain_as_day";
        let hash = hash_password(plaintext).unwrap();
        assert_ne!(hash, plaintext);
    }

    #[test]
    fn test_policy_accepts_reasonable_passwords() {
        for pw in ["seven77", "a much longer phrase", "unicode-密码-ok"] {
            assert!(validate_password_policy(pw).is_ok(), "'{}' should pass", pw);
        }
    }

    #[test]
    fn test_policy_rejects_short() {
        let result = validate_password_policy("sixsix");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("at least 7"));

        // Whitespace padding doesn't help
        assert!(validate_password_policy("   six6   ").is_err());
    }

    #[test]
    fn test_policy_rejects_password_substring_any_casing() {
        for pw in ["password", "myPassword1", "PASSWORD123", "xxPaSsWoRdxx"] {
            let result = validate_password_policy(pw);
            assert!(result.is_err(), "'{}' should be rejected", pw);
            assert!(result.unwrap_err().contains("password"));
        }
    }
}
