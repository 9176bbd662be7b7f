use async_trait::async_trait;
use database::{MemoryStore, RecordId, RecordStore, StoreError};

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: &RecordId) -> UserResult<Option<User>>;

    /// Get a user by email (exact match, case-sensitive as stored)
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List users with optional filters
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Save changes to an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID, reporting whether anything existed
    async fn delete(&self, id: &RecordId) -> UserResult<bool>;

    /// Check whether an email address is already taken
    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

/// Record-store backed implementation of UserRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    store: MemoryStore<User>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
        }
    }

    fn map_constraint(user_email: &str, err: StoreError) -> UserError {
        match err {
            StoreError::Constraint(_) => UserError::DuplicateEmail(user_email.to_string()),
            other => UserError::Store(other),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let email = user.email.clone();
        let created = self
            .store
            .insert(user)
            .await
            .map_err(|e| Self::map_constraint(&email, e))?;

        tracing::info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    async fn get_by_id(&self, id: &RecordId) -> UserResult<Option<User>> {
        Ok(self.store.get(id).await?)
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.store.find_one(|u| u.email == email).await)
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self
            .store
            .filter_page(filter.offset, filter.limit, |u| {
                if let Some(ref email) = filter.email {
                    if &u.email != email {
                        return false;
                    }
                }
                if let Some(is_active) = filter.is_active {
                    if u.is_active != is_active {
                        return false;
                    }
                }
                true
            })
            .await;
        Ok(users)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let email = user.email.clone();
        let id = user.id.clone();
        let updated = self.store.update(user).await.map_err(|e| match e {
            StoreError::NotFound => UserError::NotFound(id),
            other => Self::map_constraint(&email, other),
        })?;

        tracing::info!(user_id = %updated.id, "Updated user");
        Ok(updated)
    }

    async fn delete(&self, id: &RecordId) -> UserResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(deleted)
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateUser;

    fn user(email: &str) -> User {
        User::new(
            CreateUser {
                first_names: "Test User".to_string(),
                last_names: "Account".to_string(),
                email: email.to_string(),
                password: "irrelevant-here".to_string(),
            },
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let created = repo.create(user("a@example.com")).await.unwrap();

        let fetched = repo.get_by_id(&created.id).await.unwrap();
        assert_eq!(fetched.unwrap().email, "a@example.com");

        let by_email = repo.get_by_email("a@example.com").await.unwrap();
        assert_eq!(by_email.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("a@example.com")).await.unwrap();

        let result = repo.create(user("a@example.com")).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_differently_cased_emails_are_distinct_accounts() {
        let repo = InMemoryUserRepository::new();
        let upper = repo.create(user("Grace@Example.com")).await.unwrap();
        let lower = repo.create(user("grace@example.com")).await.unwrap();

        // Uniqueness is case-sensitive as stored; lookups match exactly.
        let found = repo.get_by_email("Grace@Example.com").await.unwrap();
        assert_eq!(found.unwrap().id, upper.id);
        let found = repo.get_by_email("grace@example.com").await.unwrap();
        assert_eq!(found.unwrap().id, lower.id);
        let found = repo.get_by_email("GRACE@EXAMPLE.COM").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_list_filters_by_active() {
        let repo = InMemoryUserRepository::new();
        let mut inactive = user("off@example.com");
        inactive.is_active = false;
        repo.create(inactive).await.unwrap();
        repo.create(user("on@example.com")).await.unwrap();

        let active = repo
            .list(UserFilter {
                is_active: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].email, "on@example.com");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let ghost = user("ghost@example.com");
        assert!(matches!(
            repo.update(ghost).await,
            Err(UserError::NotFound(_))
        ));
    }
}
