use chrono::{DateTime, Utc};
use database::{Record, RecordId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// User account entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Unique identifier
    pub id: RecordId,
    /// Given names
    pub first_names: String,
    /// Family names
    pub last_names: String,
    /// Email address (unique across all accounts)
    pub email: String,
    /// Argon2 password hash, never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Whether the account has administrative privileges
    pub is_admin: bool,
    /// Whether the account may log in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Record for User {
    fn id(&self) -> &RecordId {
        &self.id
    }

    /// Email addresses form a unique index, compared exactly as stored.
    fn conflicts_with(&self, other: &Self) -> bool {
        self.email == other.email
    }
}

impl User {
    /// Create a new user from a CreateUser DTO and a pre-hashed password
    pub fn new(input: CreateUser, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            first_names: input.first_names,
            last_names: input.last_names,
            email: input.email,
            password_hash,
            is_admin: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply updates from an UpdateUser DTO.
    ///
    /// Absent fields keep their current value. The password hash is passed
    /// separately because hashing happens in the service layer.
    pub fn apply_update(&mut self, update: UpdateUser, new_password_hash: Option<String>) {
        if let Some(first_names) = update.first_names {
            self.first_names = first_names;
        }
        if let Some(last_names) = update.last_names {
            self.last_names = last_names;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(hash) = new_password_hash {
            self.password_hash = hash;
        }
        if let Some(is_admin) = update.is_admin {
            self.is_admin = is_admin;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for registering a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 3, max = 64))]
    pub first_names: String,
    #[validate(length(min = 3, max = 64))]
    pub last_names: String,
    #[validate(email, length(max = 64))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// DTO for updating an existing user
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(length(min = 3, max = 64))]
    pub first_names: Option<String>,
    #[validate(length(min = 3, max = 64))]
    pub last_names: Option<String>,
    #[validate(email, length(max = 64))]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    /// Only honored for administrators
    pub is_admin: Option<bool>,
    /// Only honored for administrators
    pub is_active: Option<bool>,
}

impl UpdateUser {
    /// True when no field was supplied, making the update a no-op.
    pub fn is_empty(&self) -> bool {
        self.first_names.is_none()
            && self.last_names.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.is_admin.is_none()
            && self.is_active.is_none()
    }
}

/// Public projection of a user, without the password hash
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: RecordId,
    pub first_names: String,
    pub last_names: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_names: user.first_names,
            last_names: user.last_names,
            email: user.email,
            is_admin: user.is_admin,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Query filters for listing users
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    pub email: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    100
}

impl Default for UserFilter {
    fn default() -> Self {
        Self {
            email: None,
            is_active: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

/// Credentials presented at login
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Body for exchanging a refresh token for a new access token
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Token pair returned by login; refresh only returns a new access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
}

impl TokenResponse {
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input() -> CreateUser {
        CreateUser {
            first_names: "Ada Maria".to_string(),
            last_names: "Lovelace".to_string(),
            email: "Ada@Example.com".to_string(),
            password: "correct-horse".to_string(),
        }
    }

    #[test]
    fn new_user_stores_email_verbatim_and_defaults() {
        let user = User::new(create_input(), "hash".to_string());
        assert_eq!(user.email, "Ada@Example.com");
        assert!(!user.is_admin);
        assert!(user.is_active);
    }

    #[test]
    fn conflicts_on_exact_email_only() {
        let a = User::new(create_input(), "h".to_string());
        let b = User::new(create_input(), "h".to_string());
        assert!(a.conflicts_with(&b));

        // Email uniqueness is case-sensitive as stored.
        let mut input = create_input();
        input.email = "ADA@EXAMPLE.COM".to_string();
        let c = User::new(input, "h".to_string());
        assert!(!a.conflicts_with(&c));
    }

    #[test]
    fn apply_update_keeps_absent_fields() {
        let mut user = User::new(create_input(), "hash".to_string());
        let before = user.clone();

        user.apply_update(
            UpdateUser {
                last_names: Some("Byron".to_string()),
                ..Default::default()
            },
            None,
        );

        assert_eq!(user.last_names, "Byron");
        assert_eq!(user.first_names, before.first_names);
        assert_eq!(user.password_hash, before.password_hash);
    }

    #[test]
    fn password_hash_never_serializes() {
        let user = User::new(create_input(), "super-secret-hash".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("super-secret-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn empty_update_detected() {
        assert!(UpdateUser::default().is_empty());
        assert!(
            !UpdateUser {
                email: Some("x@y.com".to_string()),
                ..Default::default()
            }
            .is_empty()
        );
    }
}
