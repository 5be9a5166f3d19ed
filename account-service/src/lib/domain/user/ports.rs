use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Verification;
use crate::user::errors::LoginError;
use crate::user::errors::NotifierError;
use crate::user::errors::UserError;
use crate::user::models::EmailAddress;
use crate::user::models::Username;
use crate::user::models::VerificationCode;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user with an unredeemed verification record.
    ///
    /// Both rows are persisted atomically; the verification email is
    /// dispatched on a detached task after the commit.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Authenticate credentials and issue a bearer token.
    ///
    /// Runs the login sequence: user lookup, password check, verification
    /// check, token issuance.
    ///
    /// # Arguments
    /// * `username` - Login username
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Signed access token bound to the username
    ///
    /// # Errors
    /// * `UserNotFound` - No user with this username
    /// * `WrongPassword` - Password does not match
    /// * `NotVerified` - User has not redeemed their verification code
    /// * `TokenIssuance` - Token signing failed
    async fn login(&self, username: &Username, password: &str) -> Result<String, LoginError>;

    /// Redeem a verification code, marking the user as verified.
    ///
    /// The transition is permanent; redeeming again fails without reverting.
    ///
    /// # Arguments
    /// * `username` - User the code was issued for
    /// * `code` - Submitted code
    ///
    /// # Errors
    /// * `VerificationNotFound` - No such user or no verification record
    /// * `InvalidCode` - Submitted code does not match
    /// * `AlreadyVerified` - Code was already redeemed
    async fn redeem_verification(&self, username: &Username, code: &str)
        -> Result<(), UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve user by unique username, if one exists.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_username(&self, username: &Username)
        -> Result<Option<User>, UserError>;

    /// Change a user's username.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameUnchanged` - New username equals the current one
    /// * `UsernameAlreadyExists` - Username is already taken
    async fn update_username(&self, id: &UserId, username: Username) -> Result<User, UserError>;

    /// Change a user's email address.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailUnchanged` - New email equals the current one
    /// * `EmailAlreadyExists` - Email is already registered
    async fn update_email(&self, id: &UserId, email: EmailAddress) -> Result<User, UserError>;

    /// Change a user's password after re-verifying the current one.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `WrongCurrentPassword` - Current password does not match
    async fn update_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: String,
    ) -> Result<User, UserError>;

    /// Delete a user and their verification record.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user and their verification record atomically.
    ///
    /// Both inserts run in one transaction; a failure on either leaves no
    /// partial state.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create_with_verification(
        &self,
        user: User,
        verification: Verification,
    ) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve the verification record owned by a user.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_verification_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Verification>, UserError>;

    /// Flip a verification record to verified.
    ///
    /// # Errors
    /// * `VerificationNotFound` - Record does not exist
    /// * `DatabaseError` - Database operation failed
    async fn mark_verified(&self, verification_id: &Uuid) -> Result<(), UserError>;

    /// Update existing user in storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove a user and their verification record.
    ///
    /// The verification row is deleted before the user row, in one
    /// transaction.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}

/// Outbound delivery of verification codes.
///
/// Best-effort contract: callers dispatch without awaiting the request path,
/// failures are logged, and no retry or dead-letter handling exists.
#[async_trait]
pub trait VerificationNotifier: Send + Sync + 'static {
    /// Deliver a verification code to a freshly registered user.
    ///
    /// # Arguments
    /// * `recipient` - Destination email address
    /// * `username` - Display name for the message body
    /// * `code` - Code the user must submit to verify
    ///
    /// # Errors
    /// * `DeliveryFailed` - Transport-level failure
    /// * `Rejected` - Mail endpoint refused the message
    async fn send_verification(
        &self,
        recipient: &EmailAddress,
        username: &Username,
        code: &VerificationCode,
    ) -> Result<(), NotifierError>;
}
