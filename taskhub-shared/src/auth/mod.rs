/// Authentication utilities
///
/// This module provides the authentication primitives for TaskHub:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the signup password policy
/// - [`jwt`]: Session token signing and verification
/// - [`middleware`]: Bearer-token middleware resolving tokens to users
///
/// # Session model
///
/// A session token is an HS256-signed credential embedding the user id. It
/// carries no expiry: a token is valid exactly as long as it is present in
/// the owning user's active-token set, so logout revokes it even though the
/// signature still verifies.
///
/// # Example
///
/// ```no_run
/// use taskhub_shared::auth::password::{hash_password, verify_password};
/// use taskhub_shared::auth::jwt::{create_session_token, verify_session_token};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("red fish blue fish")?;
/// assert!(verify_password("red fish blue fish", &hash)?);
///
/// let token = create_session_token(Uuid::new_v4(), "secret-key")?;
/// let claims = verify_session_token(&token, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
