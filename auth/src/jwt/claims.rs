use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::jwt::errors::JwtError;

/// Bearer token claims.
///
/// A token carries the subject it was issued for plus the issue and expiry
/// timestamps. Fields are optional on the wire so that a decoded token with a
/// missing claim can be rejected with a precise error instead of a parse
/// failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (the username the token was issued for)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for a subject with an absolute expiry of `now + ttl`.
    ///
    /// # Arguments
    /// * `subject` - Identifier the token asserts (the username)
    /// * `ttl` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, exp, and iat set
    pub fn for_subject(subject: impl ToString, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: Some(subject.to_string()),
            exp: Some((now + ttl).timestamp()),
            iat: Some(now.timestamp()),
        }
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Get the subject, if present.
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_deref()
    }

    /// Get the subject, failing if the claim is absent.
    ///
    /// # Errors
    /// * `MissingClaim` - Token carries no `sub` claim
    pub fn require_subject(&self) -> Result<&str, JwtError> {
        self.sub
            .as_deref()
            .ok_or_else(|| JwtError::MissingClaim("sub".to_string()))
    }

    /// Check if the token is expired at the given timestamp.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| exp < current_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new().with_subject("alice");
        assert_eq!(claims.subject(), Some("alice"));
        assert!(claims.exp.is_none());
    }

    #[test]
    fn test_for_subject() {
        let claims = Claims::for_subject("alice", Duration::minutes(15));

        assert_eq!(claims.subject(), Some("alice"));
        assert!(claims.exp.is_some());
        assert!(claims.iat.is_some());

        let exp = claims.exp.unwrap();
        let iat = claims.iat.unwrap();
        assert_eq!(exp - iat, 15 * 60);
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::new().with_expiration(1000);

        assert!(!claims.is_expired(999));
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }

    #[test]
    fn test_require_subject() {
        let claims = Claims::new().with_subject("alice");
        assert_eq!(claims.require_subject().unwrap(), "alice");

        let claims = Claims::new();
        assert!(matches!(
            claims.require_subject(),
            Err(JwtError::MissingClaim(_))
        ));
    }

    #[test]
    fn test_is_expired_no_exp_claim() {
        let claims = Claims::new();
        assert!(!claims.is_expired(9999999999));
    }
}
