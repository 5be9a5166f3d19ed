//! Authentication utilities library
//!
//! Provides the authentication building blocks for the account service:
//! - Password hashing (Argon2id)
//! - JWT token issuance and validation
//! - Verification code generation
//! - Authentication coordination
//!
//! The service defines its own domain traits and adapts these implementations,
//! keeping transport and persistence concerns out of this crate.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Tokens
//! ```
//! use auth::Authenticator;
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//! let token = auth.issue_token("alice", 15).unwrap();
//! let claims = auth.validate_token(&token).unwrap();
//! assert_eq!(claims.subject(), Some("alice"));
//! ```
//!
//! ## Verification Codes
//! ```
//! use auth::CodeGenerator;
//!
//! let code = CodeGenerator::new().generate();
//! assert_eq!(code.len(), 6);
//! ```

pub mod authenticator;
pub mod code;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::Authenticator;
pub use code::CodeGenerator;
pub use jwt::Algorithm;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
