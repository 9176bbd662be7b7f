use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use database::RecordId;
use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserFilter, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

// Manual impl: the repository is behind an Arc, so cloning the service
// must not require `R: Clone`.
impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a new user with password hashing.
    ///
    /// Email uniqueness is enforced twice: a pre-check for a friendly error
    /// and the store's unique index for the race window.
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        if self.repository.email_exists(&input.email).await? {
            return Err(UserError::DuplicateEmail(input.email));
        }

        let password_hash = self.hash_password(&input.password)?;
        let user = User::new(input, password_hash);

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }

    /// Get a user by ID
    pub async fn get_user(&self, id: &RecordId) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.clone()))?;

        Ok(user.into())
    }

    /// Get the full user record by email, for auth flows
    pub async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        self.repository.get_by_email(email).await
    }

    /// List users with filters
    pub async fn list_users(&self, filter: UserFilter) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list(filter).await?;
        Ok(users.into_iter().map(|u| u.into()).collect())
    }

    /// Update a user.
    ///
    /// Absent fields keep their current value, so the same path serves both
    /// full update and partial patch. An empty body is a no-op that still
    /// returns the current state.
    pub async fn update_user(&self, id: &RecordId, input: UpdateUser) -> UserResult<UserResponse> {
        let mut user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.clone()))?;

        if input.is_empty() {
            return Ok(user.into());
        }

        // Check for duplicate email if email is being changed
        if let Some(ref new_email) = input.email
            && new_email != &user.email
            && self.repository.email_exists(new_email).await?
        {
            return Err(UserError::DuplicateEmail(new_email.clone()));
        }

        let new_password_hash = match input.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        user.apply_update(input, new_password_hash);

        let updated = self.repository.update(user).await?;
        Ok(updated.into())
    }

    /// Delete a user
    pub async fn delete_user(&self, id: &RecordId) -> UserResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(UserError::NotFound(id.clone()));
        }

        Ok(())
    }

    /// Verify login credentials, returning the full record on success.
    ///
    /// Inactive accounts fail even with a correct password.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> UserResult<User> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active {
            return Err(UserError::Inactive);
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    // Password helpers

    fn hash_password(&self, password: &str) -> UserResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> UserResult<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
