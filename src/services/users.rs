//! Authentication and user management service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, NewUser, User, UserClaims},
    repository::{Repository, UserStore},
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

    /// Check credentials and return a JWT together with the account
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!(username, "Rejected login");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            can_mark_returned: user.can_mark_returned,
            exp: now + self.config.jwt_expiration_hours as i64 * 3600,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password with argon2 and a random salt
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.get_user(id).await
    }

    pub async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        data.validate()?;
        let new_user = NewUser {
            username: data.username.clone(),
            password_hash: self.hash_password(&data.password)?,
            can_mark_returned: data.can_mark_returned,
        };
        let user = self.repository.create_user(&new_user).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Delete an account; copies it borrowed lose their borrower
    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.delete_user(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Create the configured staff account when it does not exist yet
    pub async fn ensure_admin(&self) -> AppResult<Option<User>> {
        let (Some(username), Some(password)) =
            (&self.config.admin_username, &self.config.admin_password)
        else {
            return Ok(None);
        };

        if let Some(existing) = self.repository.find_user_by_username(username).await? {
            tracing::debug!(user_id = existing.id, "Staff account already present");
            return Ok(Some(existing));
        }

        let user = self
            .create_user(&CreateUser {
                username: username.clone(),
                password: password.clone(),
                can_mark_returned: true,
            })
            .await?;
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(admin: Option<(&str, &str)>) -> UsersService {
        let config = AuthConfig {
            admin_username: admin.map(|(u, _)| u.to_string()),
            admin_password: admin.map(|(_, p)| p.to_string()),
            ..AuthConfig::default()
        };
        UsersService::new(Repository::in_memory(), config)
    }

    #[tokio::test]
    async fn test_login_issues_token_with_capability() {
        let users = service(None);
        users
            .create_user(&CreateUser {
                username: "librarian".to_string(),
                password: "secret".to_string(),
                can_mark_returned: true,
            })
            .await
            .unwrap();

        let (token, user) = users.authenticate("librarian", "secret").await.unwrap();
        let claims = UserClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert!(claims.can_mark_returned);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let users = service(None);
        users
            .create_user(&CreateUser {
                username: "reader".to_string(),
                password: "secret".to_string(),
                can_mark_returned: false,
            })
            .await
            .unwrap();

        assert!(matches!(
            users.authenticate("reader", "guess").await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            users.authenticate("nobody", "secret").await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let users = service(Some(("admin", "admin-pass")));
        let first = users.ensure_admin().await.unwrap().unwrap();
        let second = users.ensure_admin().await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert!(first.can_mark_returned);

        assert!(service(None).ensure_admin().await.unwrap().is_none());
    }
}
