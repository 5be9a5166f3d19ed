use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error(
        "Username contains invalid characters (only alphanumeric, underscore, and hyphen allowed)"
    )]
    InvalidCharacters,
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for VerificationCode validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationCodeError {
    #[error("Verification code must be exactly {expected} alphanumeric characters")]
    InvalidFormat { expected: usize },
}

/// Error for verification email delivery
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    #[error("Failed to build verification email: {0}")]
    InvalidMessage(String),

    #[error("Failed to deliver verification email: {0}")]
    DeliveryFailed(String),

    #[error("Mail endpoint rejected the message: {0}")]
    Rejected(String),
}

/// Top-level error for all user-related operations
#[derive(Debug, Clone, Error)]
pub enum UserError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid verification code: {0}")]
    InvalidCodeFormat(#[from] VerificationCodeError),

    // Domain-level errors
    #[error("User with ID {0} not found")]
    NotFound(String),

    #[error("Verification code not found")]
    VerificationNotFound,

    #[error("Invalid verification code")]
    InvalidCode,

    #[error("User is already verified")]
    AlreadyVerified,

    #[error("Username already exists: {0}")]
    UsernameAlreadyExists(String),

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Username is the same")]
    UsernameUnchanged,

    #[error("Email is the same")]
    EmailUnchanged,

    #[error("Wrong password")]
    WrongCurrentPassword,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        UserError::Unknown(err.to_string())
    }
}

/// Login flow failures.
///
/// The first three variants all surface as the same unauthorized response;
/// they stay distinct here so the flow can be logged and tested precisely.
#[derive(Debug, Clone, Error)]
pub enum LoginError {
    #[error("User not found")]
    UserNotFound,

    #[error("Incorrect password")]
    WrongPassword,

    #[error("User not verified")]
    NotVerified,

    #[error("Token generation failed: {0}")]
    TokenIssuance(String),

    #[error(transparent)]
    Internal(#[from] UserError),
}
