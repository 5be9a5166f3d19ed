use chrono::Duration;
use jsonwebtoken::Algorithm;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token handling.
///
/// Holds the server signing secret and provides the high-level operations the
/// service needs: hashing and checking credentials, and issuing and validating
/// bearer tokens.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
}

impl Authenticator {
    /// Create a new authenticator signing with HS256.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_algorithm(jwt_secret, Algorithm::HS256)
    }

    /// Create a new authenticator with an explicit signing algorithm.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    /// * `algorithm` - HMAC algorithm identifier
    pub fn with_algorithm(jwt_secret: &[u8], algorithm: Algorithm) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            jwt_handler: JwtHandler::with_algorithm(jwt_secret, algorithm),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Arguments
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Hashed password string
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored hash.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    ///
    /// # Returns
    /// True if the password matches the stored hash
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Issue a bearer token for a subject.
    ///
    /// # Arguments
    /// * `subject` - Identifier the token asserts (the username)
    /// * `ttl_minutes` - Minutes until the token expires
    ///
    /// # Returns
    /// Signed token string
    ///
    /// # Errors
    /// * `JwtError` - Token encoding failed
    pub fn issue_token(&self, subject: &str, ttl_minutes: i64) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, Duration::minutes(ttl_minutes));
        self.jwt_handler.encode(&claims)
    }

    /// Validate and decode a bearer token.
    ///
    /// # Arguments
    /// * `token` - Token string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `TokenExpired` - Token has expired
    /// * `DecodingFailed` - Token is malformed or the signature does not verify
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.jwt_handler.decode(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        assert!(authenticator.verify_password("my_password", &hash));
        assert!(!authenticator.verify_password("wrong_password", &hash));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let token = authenticator
            .issue_token("alice", 15)
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = authenticator
            .validate_token(&token)
            .expect("Token validation failed");
        assert_eq!(claims.subject(), Some("alice"));
    }

    #[test]
    fn test_validate_expired_token() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let token = authenticator
            .issue_token("alice", -1)
            .expect("Failed to issue token");

        let result = authenticator.validate_token(&token);
        assert!(matches!(result, Err(JwtError::TokenExpired)));
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(b"test_secret_key_at_least_32_bytes!");

        let result = authenticator.validate_token("invalid.token.here");
        assert!(matches!(result, Err(JwtError::DecodingFailed(_))));
    }
}
