use crate::user::model::{
    AuthorProfile, CreateUserRequest, ProfileChanges, UpdateProfileRequest, User, WordTally,
};
use crate::user::repository::UserRepository;
use crate::utils::error::CustomError;
use crate::utils::hashing;
use crate::utils::helpers::{
    RESET_TOKEN_EXPIRATION_MINUTES, generate_reset_token, hash_token, month_key,
};
use crate::utils::model::{ImageRef, LoginRequest};
use crate::utils::validation::{check_length, require, validate_email, validate_password};
use chrono::{Duration, Utc};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub const NAME_MAX_LENGTH: usize = 60;
pub const BIO_MAX_LENGTH: usize = 500;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        UserService { users }
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, CustomError> {
        let name = require("Name", request.name.as_deref())?;
        let email = require("Email", request.email.as_deref())?.to_lowercase();
        let password = request
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CustomError::ValidationError("Password is required".into()))?;

        check_length("Name", name, Some(2), Some(NAME_MAX_LENGTH))?;
        validate_email(&email)?;
        validate_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CustomError::ConflictError(
                "Email already registered".to_string(),
            ));
        }

        let hashed_password = hashing::hash_password(password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: ObjectId::new(),
            name: name.to_string(),
            email,
            password: hashed_password,
            avatar: None,
            bio: String::new(),
            role: Default::default(),
            words_this_month: 0,
            words_month: month_key(now),
            posts: Vec::new(),
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now,
            updated_at: now,
        };

        self.users.insert(&user).await?;
        log::info!("Registered user {}", user.id);

        Ok(user)
    }

    pub async fn authenticate_user(&self, login: LoginRequest) -> Result<User, CustomError> {
        let email = require("Email", login.email.as_deref())?.to_lowercase();
        let password = login
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| CustomError::ValidationError("Password is required".into()))?;

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| CustomError::UnauthorizedError("Invalid credentials".to_string()))?;

        if !hashing::verify_password(password, &user.password)
            .map_err(|_| CustomError::UnauthorizedError("Invalid credentials".to_string()))?
        {
            return Err(CustomError::UnauthorizedError(
                "Invalid credentials".to_string(),
            ));
        }

        Ok(user)
    }

    pub async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
        self.users.find_by_id(id).await
    }

    async fn get_user(&self, id: &ObjectId) -> Result<User, CustomError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))
    }

    pub async fn get_author(&self, id: &ObjectId) -> Result<AuthorProfile, CustomError> {
        let user = self.get_user(id).await?;
        Ok(AuthorProfile::from(&user))
    }

    pub async fn update_profile(
        &self,
        id: &ObjectId,
        request: UpdateProfileRequest,
    ) -> Result<User, CustomError> {
        let mut changes = ProfileChanges::default();

        if let Some(name) = request.name {
            let name = name.trim();
            check_length("Name", name, Some(2), Some(NAME_MAX_LENGTH))?;
            changes.name = Some(name.to_string());
        }
        if let Some(bio) = request.bio {
            let bio = bio.trim();
            check_length("Bio", bio, None, Some(BIO_MAX_LENGTH))?;
            changes.bio = Some(bio.to_string());
        }
        if let Some(avatar) = request.avatar {
            validate_image(&avatar)?;
            changes.avatar = Some(avatar);
        }

        self.users
            .update_profile(id, &changes)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("User not found".to_string()))
    }

    pub async fn change_password(
        &self,
        id: &ObjectId,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CustomError> {
        let user = self.get_user(id).await?;

        let matches = hashing::verify_password(current_password, &user.password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        if !matches {
            return Err(CustomError::UnauthorizedError(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(new_password)?;
        let hashed = hashing::hash_password(new_password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        if !self.users.set_password(id, &hashed).await? {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }
        Ok(())
    }

    /// Stores the digest of a fresh reset token. `None` when no account uses
    /// the email.
    pub async fn issue_reset_token(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, CustomError> {
        let email = email.trim().to_lowercase();
        let Some(user) = self.users.find_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires = Utc::now() + Duration::minutes(RESET_TOKEN_EXPIRATION_MINUTES);
        if !self
            .users
            .set_reset_token(&user.id, &hash_token(&token), expires)
            .await?
        {
            return Ok(None);
        }

        Ok(Some((user, token)))
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), CustomError> {
        let invalid = || CustomError::BadRequestError("Reset token is invalid or has expired".into());
        let token_hash = hash_token(token);

        let user = self
            .users
            .find_by_reset_token(&token_hash)
            .await?
            .ok_or_else(invalid)?;

        match user.reset_password_expires {
            Some(expires) if expires > Utc::now() => {}
            _ => return Err(invalid()),
        }

        validate_password(password)?;
        let hashed = hashing::hash_password(password)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        if !self
            .users
            .redeem_reset_token(&user.id, &token_hash, &hashed)
            .await?
        {
            return Err(invalid());
        }
        Ok(())
    }

    /// Link a new post to its author and add its words to this month's tally.
    pub async fn record_post(
        &self,
        author_id: &ObjectId,
        post_id: &ObjectId,
        words: usize,
    ) -> Result<(), CustomError> {
        let tally = WordTally {
            month: month_key(Utc::now()),
            words: words as i64,
        };

        if !self.users.attach_post(author_id, post_id, &tally).await? {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }
        Ok(())
    }

    pub async fn forget_post(
        &self,
        author_id: &ObjectId,
        post_id: &ObjectId,
    ) -> Result<(), CustomError> {
        self.users.detach_post(author_id, post_id).await
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<(), CustomError> {
        if !self.users.delete(id).await? {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }
        log::info!("Deleted user {}", id);
        Ok(())
    }
}

fn validate_image(image: &ImageRef) -> Result<(), CustomError> {
    require("Avatar id", Some(image.id.as_str()))?;
    require("Avatar url", Some(image.url.as_str()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::{InMemoryUserRepository, sample_user};
    use chrono::DateTime;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserRepository::default()))
    }

    fn signup(name: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[actix_web::test]
    async fn register_then_login() {
        let service = service();
        let user = service
            .create_user(signup("Ada", "Ada@Example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password, "secret123");

        let logged_in = service
            .authenticate_user(login("ada@example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[actix_web::test]
    async fn duplicate_email_conflicts() {
        let service = service();
        service
            .create_user(signup("Ada", "ada@example.com", "secret123"))
            .await
            .unwrap();
        let err = service
            .create_user(signup("Other", "ada@example.com", "secret456"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));
    }

    #[actix_web::test]
    async fn missing_fields_are_rejected() {
        let err = service()
            .create_user(CreateUserRequest {
                name: Some("Ada".into()),
                email: None,
                password: Some("secret123".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(_)));
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorized() {
        let service = service();
        service
            .create_user(signup("Ada", "ada@example.com", "secret123"))
            .await
            .unwrap();

        let err = service
            .authenticate_user(login("ada@example.com", "nope-nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::UnauthorizedError(_)));

        let err = service
            .authenticate_user(login("nobody@example.com", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::UnauthorizedError(_)));
    }

    #[actix_web::test]
    async fn reset_token_is_single_use() {
        let service = service();
        service
            .create_user(signup("Ada", "ada@example.com", "secret123"))
            .await
            .unwrap();

        let (_, token) = service
            .issue_reset_token("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        service.reset_password(&token, "fresh-pass").await.unwrap();

        assert!(
            service
                .authenticate_user(login("ada@example.com", "fresh-pass"))
                .await
                .is_ok()
        );
        assert!(service.reset_password(&token, "again-pass").await.is_err());
        assert!(
            service
                .issue_reset_token("ghost@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[actix_web::test]
    async fn record_post_accumulates_monthly_words() {
        let service = service();
        let user = service
            .create_user(signup("Ada", "ada@example.com", "secret123"))
            .await
            .unwrap();

        service
            .record_post(&user.id, &ObjectId::new(), 120)
            .await
            .unwrap();
        service
            .record_post(&user.id, &ObjectId::new(), 30)
            .await
            .unwrap();

        let stored = service.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.words_this_month, 150);
        assert_eq!(stored.posts.len(), 2);
    }

    /// Publishes a post for the user while a profile edit is in flight.
    struct BusyUsers {
        inner: InMemoryUserRepository,
        post: ObjectId,
    }

    #[async_trait::async_trait]
    impl UserRepository for BusyUsers {
        async fn insert(&self, user: &User) -> Result<(), CustomError> {
            self.inner.insert(user).await
        }
        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, CustomError> {
            self.inner.find_by_id(id).await
        }
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, CustomError> {
            self.inner.find_by_email(email).await
        }
        async fn find_by_reset_token(&self, token_hash: &str) -> Result<Option<User>, CustomError> {
            self.inner.find_by_reset_token(token_hash).await
        }
        async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<User>, CustomError> {
            self.inner.find_many(ids).await
        }
        async fn update_profile(
            &self,
            id: &ObjectId,
            changes: &ProfileChanges,
        ) -> Result<Option<User>, CustomError> {
            let tally = WordTally {
                month: month_key(Utc::now()),
                words: 75,
            };
            self.inner.attach_post(id, &self.post, &tally).await?;
            self.inner.update_profile(id, changes).await
        }
        async fn set_password(&self, id: &ObjectId, password_hash: &str) -> Result<bool, CustomError> {
            self.inner.set_password(id, password_hash).await
        }
        async fn set_reset_token(
            &self,
            id: &ObjectId,
            token_hash: &str,
            expires: DateTime<Utc>,
        ) -> Result<bool, CustomError> {
            self.inner.set_reset_token(id, token_hash, expires).await
        }
        async fn redeem_reset_token(
            &self,
            id: &ObjectId,
            token_hash: &str,
            password_hash: &str,
        ) -> Result<bool, CustomError> {
            self.inner
                .redeem_reset_token(id, token_hash, password_hash)
                .await
        }
        async fn attach_post(
            &self,
            user_id: &ObjectId,
            post_id: &ObjectId,
            tally: &WordTally,
        ) -> Result<bool, CustomError> {
            self.inner.attach_post(user_id, post_id, tally).await
        }
        async fn detach_post(&self, user_id: &ObjectId, post_id: &ObjectId) -> Result<(), CustomError> {
            self.inner.detach_post(user_id, post_id).await
        }
        async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
            self.inner.delete(id).await
        }
    }

    #[actix_web::test]
    async fn profile_edit_keeps_post_published_meanwhile() {
        let post = ObjectId::new();
        let repo = Arc::new(BusyUsers {
            inner: InMemoryUserRepository::default(),
            post,
        });
        let user = sample_user("Ada", "ada@example.com");
        repo.insert(&user).await.unwrap();
        let service = UserService::new(repo.clone());

        let updated = service
            .update_profile(
                &user.id,
                UpdateProfileRequest {
                    name: Some("  Ada Lovelace ".into()),
                    bio: Some("Writes about engines".into()),
                    avatar: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Ada Lovelace");

        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Ada Lovelace");
        assert_eq!(stored.bio, "Writes about engines");
        assert_eq!(stored.posts, vec![post]);
        assert_eq!(stored.words_this_month, 75);
    }

    #[actix_web::test]
    async fn profile_edit_for_missing_user_is_not_found() {
        let err = service()
            .update_profile(
                &ObjectId::new(),
                UpdateProfileRequest {
                    name: Some("Ada".into()),
                    bio: None,
                    avatar: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }

    #[actix_web::test]
    async fn stale_month_tally_starts_over() {
        let repo = Arc::new(InMemoryUserRepository::default());
        let mut user = sample_user("Ada", "ada@example.com");
        user.words_month = "2000-01".to_string();
        user.words_this_month = 500;
        repo.insert(&user).await.unwrap();
        let service = UserService::new(repo.clone());

        service
            .record_post(&user.id, &ObjectId::new(), 40)
            .await
            .unwrap();

        let stored = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.words_this_month, 40);
        assert_eq!(stored.words_month, month_key(Utc::now()));
    }

    #[actix_web::test]
    async fn record_post_for_missing_user_is_not_found() {
        let err = service()
            .record_post(&ObjectId::new(), &ObjectId::new(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }
}
