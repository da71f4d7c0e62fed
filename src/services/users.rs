//! Library user registration and authentication

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LibraryUser, NewLibraryUser, RegisterUser, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a regular (non admin) user
    pub async fn register(&self, request: RegisterUser) -> AppResult<LibraryUser> {
        self.create(&request.username, &request.password, false).await
    }

    /// Create the configured administrator unless the username is taken
    pub async fn ensure_admin(&self, username: &str, password: &str) -> AppResult<()> {
        if self
            .repository
            .catalog
            .find_user_by_username(username)
            .await?
            .is_some()
        {
            return Ok(());
        }
        self.create(username, password, true).await?;
        Ok(())
    }

    async fn create(&self, username: &str, password: &str, is_admin: bool) -> AppResult<LibraryUser> {
        let user = NewLibraryUser {
            username: username.to_string(),
            password_hash: self.hash_password(password)?,
            is_admin,
        };
        let created = self.repository.catalog.insert_user(&user).await?;
        tracing::info!("User '{}' registered (admin: {})", created.username, created.is_admin);
        Ok(created)
    }

    /// Check credentials and issue a JWT
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, LibraryUser)> {
        let user = self
            .repository
            .catalog
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            is_admin: user.is_admin,
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    fn verify_password(&self, user: &LibraryUser, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
