use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::CodeGenerator;
use chrono::Utc;

use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Verification;
use crate::domain::user::models::VerificationCode;
use crate::user::errors::LoginError;
use crate::user::errors::UserError;
use crate::user::models::EmailAddress;
use crate::user::models::Username;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;
use crate::user::ports::VerificationNotifier;

/// Domain service implementation for account operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR, VN>
where
    UR: UserRepository,
    VN: VerificationNotifier,
{
    repository: Arc<UR>,
    notifier: Arc<VN>,
    authenticator: Arc<Authenticator>,
    token_ttl_minutes: i64,
    code_generator: CodeGenerator,
}

impl<UR, VN> UserService<UR, VN>
where
    UR: UserRepository,
    VN: VerificationNotifier,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `notifier` - Verification email delivery implementation
    /// * `authenticator` - Password and token operations
    /// * `token_ttl_minutes` - Lifetime of issued access tokens
    pub fn new(
        repository: Arc<UR>,
        notifier: Arc<VN>,
        authenticator: Arc<Authenticator>,
        token_ttl_minutes: i64,
    ) -> Self {
        Self {
            repository,
            notifier,
            authenticator,
            token_ttl_minutes,
            code_generator: CodeGenerator::new(),
        }
    }
}

#[async_trait]
impl<UR, VN> UserServicePort for UserService<UR, VN>
where
    UR: UserRepository,
    VN: VerificationNotifier,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let password_hash = self
            .authenticator
            .hash_password(&command.password)
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            created_at: Utc::now(),
        };

        let code = VerificationCode::new(self.code_generator.generate())?;
        let verification = Verification::issue(user.id, code.clone());

        let created_user = self
            .repository
            .create_with_verification(user, verification)
            .await?;

        // Best-effort dispatch: the rows are already committed, so a delivery
        // failure is logged and never propagated. No retry exists.
        let notifier = Arc::clone(&self.notifier);
        let recipient = created_user.email.clone();
        let username = created_user.username.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send_verification(&recipient, &username, &code).await {
                tracing::warn!(
                    "Failed to send verification email to {}: {}",
                    recipient.as_str(),
                    e
                );
            }
        });

        Ok(created_user)
    }

    async fn login(&self, username: &Username, password: &str) -> Result<String, LoginError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(LoginError::UserNotFound)?;

        if !self
            .authenticator
            .verify_password(password, &user.password_hash)
        {
            return Err(LoginError::WrongPassword);
        }

        // A user without a verification row cannot have redeemed a code.
        let verification = self
            .repository
            .find_verification_by_user_id(&user.id)
            .await?;
        if !verification.map_or(false, |v| v.is_verified) {
            return Err(LoginError::NotVerified);
        }

        self.authenticator
            .issue_token(user.username.as_str(), self.token_ttl_minutes)
            .map_err(|e| LoginError::TokenIssuance(e.to_string()))
    }

    async fn redeem_verification(
        &self,
        username: &Username,
        code: &str,
    ) -> Result<(), UserError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(UserError::VerificationNotFound)?;

        let verification = self
            .repository
            .find_verification_by_user_id(&user.id)
            .await?
            .ok_or(UserError::VerificationNotFound)?;

        if !verification.code.matches(code) {
            return Err(UserError::InvalidCode);
        }

        if verification.is_verified {
            return Err(UserError::AlreadyVerified);
        }

        self.repository.mark_verified(&verification.id).await
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn get_user_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserError> {
        self.repository.find_by_username(username).await
    }

    async fn update_username(&self, id: &UserId, username: Username) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if user.username == username {
            return Err(UserError::UsernameUnchanged);
        }

        user.username = username;
        self.repository.update(user).await
    }

    async fn update_email(&self, id: &UserId, email: EmailAddress) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if user.email == email {
            return Err(UserError::EmailUnchanged);
        }

        user.email = email;
        self.repository.update(user).await
    }

    async fn update_password(
        &self,
        id: &UserId,
        current_password: &str,
        new_password: String,
    ) -> Result<User, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if !self
            .authenticator
            .verify_password(current_password, &user.password_hash)
        {
            return Err(UserError::WrongCurrentPassword);
        }

        user.password_hash = self
            .authenticator
            .hash_password(&new_password)
            .map_err(|e| UserError::Unknown(format!("Password hashing failed: {}", e)))?;

        self.repository.update(user).await
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;
    use mockall::predicate::*;
    use uuid::Uuid;

    use super::*;
    use crate::user::errors::NotifierError;

    const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    // Define mocks in the test module using mockall
    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create_with_verification(&self, user: User, verification: Verification) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;
            async fn find_verification_by_user_id(&self, user_id: &UserId) -> Result<Option<Verification>, UserError>;
            async fn mark_verified(&self, verification_id: &Uuid) -> Result<(), UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
            async fn delete(&self, id: &UserId) -> Result<(), UserError>;
        }
    }

    mock! {
        pub TestNotifier {}

        #[async_trait]
        impl VerificationNotifier for TestNotifier {
            async fn send_verification(&self, recipient: &EmailAddress, username: &Username, code: &VerificationCode) -> Result<(), NotifierError>;
        }
    }

    fn test_authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(TEST_SECRET))
    }

    fn test_service(
        repository: MockTestUserRepository,
        notifier: MockTestNotifier,
    ) -> UserService<MockTestUserRepository, MockTestNotifier> {
        UserService::new(
            Arc::new(repository),
            Arc::new(notifier),
            test_authenticator(),
            15,
        )
    }

    #[tokio::test]
    async fn test_register_creates_user_and_verification() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create_with_verification()
            .withf(|user, verification| {
                user.username.as_str() == "testuser"
                    && user.email.as_str() == "test@example.com"
                    && user.password_hash.starts_with("$argon2")
                    && verification.user_id == user.id
                    && !verification.is_verified
                    && verification.code.as_str().len() == 6
            })
            .times(1)
            .returning(|user, _| Ok(user));

        // The email is dispatched on a detached task; it may or may not have
        // run by the time the test finishes.
        notifier
            .expect_send_verification()
            .returning(|_, _, _| Ok(()));

        let service = test_service(repository, notifier);

        let command = RegisterUserCommand {
            username: Username::new("testuser".to_string()).unwrap(),
            email: EmailAddress::new("test@example.com".to_string()).unwrap(),
            password: "password123".to_string(),
        };

        let result = service.register(command).await;
        assert!(result.is_ok());

        let user = result.unwrap();
        assert_eq!(user.username.as_str(), "testuser");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let mut repository = MockTestUserRepository::new();
        let mut notifier = MockTestNotifier::new();

        repository
            .expect_create_with_verification()
            .times(1)
            .returning(|user, _| {
                Err(UserError::UsernameAlreadyExists(
                    user.username.as_str().to_string(),
                ))
            });

        notifier.expect_send_verification().times(0);

        let service = test_service(repository, notifier);

        let command = RegisterUserCommand {
            username: Username::new("testuser".to_string()).unwrap(),
            email: EmailAddress::new("test2@example.com".to_string()).unwrap(),
            password: "password456".to_string(),
        };

        let result = service.register(command).await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::UsernameAlreadyExists(_)
        ));
    }

    #[tokio::test]
    async fn test_login_success_issues_valid_token() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        let returned_user = user.clone();
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(returned_user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(verified_verification(user_id))));

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let token = service
            .login(&username, "pass_word!")
            .await
            .expect("Login failed");

        let claims = test_authenticator()
            .validate_token(&token)
            .expect("Issued token failed validation");
        assert_eq!(claims.subject(), Some("alice"));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = test_service(repository, notifier);

        let username = Username::new("ghost".to_string()).unwrap();
        let result = service.login(&username, "whatever").await;
        assert!(matches!(result.unwrap_err(), LoginError::UserNotFound));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        // The flow must fail before the verification lookup.
        repository.expect_find_verification_by_user_id().times(0);

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.login(&username, "wrong_password").await;
        assert!(matches!(result.unwrap_err(), LoginError::WrongPassword));
    }

    #[tokio::test]
    async fn test_login_unverified_user() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .times(1)
            .returning(move |_| Ok(Some(unverified_verification(user_id))));

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.login(&username, "pass_word!").await;
        assert!(matches!(result.unwrap_err(), LoginError::NotVerified));
    }

    #[tokio::test]
    async fn test_login_missing_verification_row_is_not_verified() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.login(&username, "pass_word!").await;
        assert!(matches!(result.unwrap_err(), LoginError::NotVerified));
    }

    #[tokio::test]
    async fn test_redeem_verification_success() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;
        let verification = unverified_verification(user_id);
        let verification_id = verification.id;

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .times(1)
            .returning(move |_| Ok(Some(verification.clone())));

        repository
            .expect_mark_verified()
            .withf(move |id| *id == verification_id)
            .times(1)
            .returning(|_| Ok(()));

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.redeem_verification(&username, "Ab3xY9").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_redeem_verification_wrong_code() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .times(1)
            .returning(move |_| Ok(Some(unverified_verification(user_id))));

        repository.expect_mark_verified().times(0);

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.redeem_verification(&username, "zzzzzz").await;
        assert!(matches!(result.unwrap_err(), UserError::InvalidCode));
    }

    #[tokio::test]
    async fn test_redeem_verification_already_verified() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_username()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_find_verification_by_user_id()
            .times(1)
            .returning(move |_| Ok(Some(verified_verification(user_id))));

        repository.expect_mark_verified().times(0);

        let service = test_service(repository, notifier);

        let username = Username::new("alice".to_string()).unwrap();
        let result = service.redeem_verification(&username, "Ab3xY9").await;
        assert!(matches!(result.unwrap_err(), UserError::AlreadyVerified));
    }

    #[tokio::test]
    async fn test_redeem_verification_unknown_user() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_username()
            .times(1)
            .returning(|_| Ok(None));

        let service = test_service(repository, notifier);

        let username = Username::new("ghost".to_string()).unwrap();
        let result = service.redeem_verification(&username, "Ab3xY9").await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::VerificationNotFound
        ));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = test_service(repository, notifier);

        let result = service.get_user(&UserId::new()).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_username_success() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("olduser", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository
            .expect_update()
            .withf(|user| user.username.as_str() == "newuser")
            .times(1)
            .returning(|user| Ok(user));

        let service = test_service(repository, notifier);

        let result = service
            .update_username(&user_id, Username::new("newuser".to_string()).unwrap())
            .await;
        assert_eq!(result.unwrap().username.as_str(), "newuser");
    }

    #[tokio::test]
    async fn test_update_username_unchanged_is_conflict() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository.expect_update().times(0);

        let service = test_service(repository, notifier);

        let result = service
            .update_username(&user_id, Username::new("alice".to_string()).unwrap())
            .await;
        assert!(matches!(result.unwrap_err(), UserError::UsernameUnchanged));
    }

    #[tokio::test]
    async fn test_update_email_unchanged_is_conflict() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "pass_word!");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository.expect_update().times(0);

        let service = test_service(repository, notifier);

        let result = service
            .update_email(
                &user_id,
                EmailAddress::new("alice@example.com".to_string()).unwrap(),
            )
            .await;
        assert!(matches!(result.unwrap_err(), UserError::EmailUnchanged));
    }

    #[tokio::test]
    async fn test_update_password_requires_current_password() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "old_password");
        let user_id = user.id;

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        repository.expect_update().times(0);

        let service = test_service(repository, notifier);

        let result = service
            .update_password(&user_id, "not_the_old_password", "new_password".to_string())
            .await;
        assert!(matches!(
            result.unwrap_err(),
            UserError::WrongCurrentPassword
        ));
    }

    #[tokio::test]
    async fn test_update_password_success_rehashes() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user = build_user("alice", "old_password");
        let user_id = user.id;
        let old_hash = user.password_hash.clone();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let expected_old_hash = old_hash.clone();
        repository
            .expect_update()
            .withf(move |user| {
                user.password_hash != expected_old_hash
                    && user.password_hash.starts_with("$argon2")
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = test_service(repository, notifier);

        let result = service
            .update_password(&user_id, "old_password", "new_password".to_string())
            .await;
        assert!(result.is_ok());

        let updated = result.unwrap();
        assert!(test_authenticator().verify_password("new_password", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_delete_user_not_found() {
        let mut repository = MockTestUserRepository::new();
        let notifier = MockTestNotifier::new();

        let user_id = UserId::new();
        repository
            .expect_delete()
            .times(1)
            .returning(move |_| Err(UserError::NotFound(user_id.to_string())));

        let service = test_service(repository, notifier);

        let result = service.delete_user(&user_id).await;
        assert!(matches!(result.unwrap_err(), UserError::NotFound(_)));
    }

    fn build_user(username: &str, password: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(format!("{}@example.com", username)).unwrap(),
            password_hash: test_authenticator().hash_password(password).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn unverified_verification(user_id: UserId) -> Verification {
        Verification::issue(
            user_id,
            VerificationCode::new("Ab3xY9".to_string()).unwrap(),
        )
    }

    fn verified_verification(user_id: UserId) -> Verification {
        let mut verification = unverified_verification(user_id);
        verification.is_verified = true;
        verification
    }
}
