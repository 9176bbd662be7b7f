//! Login, token refresh, and the bearer-token request guard.

use axum::{
    Json, Router,
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::post,
};
use axum_helpers::{
    AuthError, JwtAuth, TokenKind, ValidatedJson,
    errors::responses::{BadRequestValidationResponse, UnauthorizedResponse},
    extract_bearer,
};
use database::RecordId;
use serde::{Deserialize, Serialize};
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, RefreshRequest, TokenResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "auth";

/// OpenAPI documentation for the auth endpoints
#[derive(OpenApi)]
#[openapi(
    paths(login, refresh),
    components(
        schemas(LoginRequest, RefreshRequest, TokenResponse),
        responses(BadRequestValidationResponse, UnauthorizedResponse)
    ),
    tags(
        (name = TAG, description = "Login and token refresh")
    )
)]
pub struct ApiDoc;

/// Shared state for the auth endpoints and the guard middleware
pub struct AuthState<R: UserRepository> {
    pub service: UserService<R>,
    pub jwt: JwtAuth,
}

// Manual impl: `Router::with_state` needs this for any repository type,
// including ones that are not themselves `Clone`.
impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            jwt: self.jwt.clone(),
        }
    }
}

/// Identity of the authenticated caller, inserted as a request extension
/// by [`require_auth`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: RecordId,
    pub email: String,
    pub is_admin: bool,
}

impl AuthUser {
    /// True when the caller may act on the given owner's resources.
    pub fn can_access(&self, owner_id: &RecordId) -> bool {
        self.is_admin || &self.id == owner_id
    }
}

/// Router for the public auth endpoints
pub fn router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .with_state(state)
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<TokenResponse>> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;

    let access = state
        .jwt
        .create_access_token(&user.email)
        .map_err(|e| UserError::Internal(format!("Failed to create access token: {}", e)))?;
    let refresh = state
        .jwt
        .create_refresh_token(&user.email)
        .map_err(|e| UserError::Internal(format!("Failed to create refresh token: {}", e)))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(TokenResponse::new(access, Some(refresh))))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/refresh",
    tag = TAG,
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = TokenResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn refresh<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ValidatedJson(input): ValidatedJson<RefreshRequest>,
) -> UserResult<Json<TokenResponse>> {
    let claims = state
        .jwt
        .verify_kind(&input.refresh_token, TokenKind::Refresh)
        .map_err(|_| UserError::InvalidCredentials)?;

    // The account must still exist and be active at refresh time.
    let user = state
        .service
        .get_by_email(&claims.sub)
        .await?
        .ok_or(UserError::InvalidCredentials)?;
    if !user.is_active {
        return Err(UserError::Inactive);
    }

    let access = state
        .jwt
        .create_access_token(&user.email)
        .map_err(|e| UserError::Internal(format!("Failed to create access token: {}", e)))?;

    Ok(Json(TokenResponse::new(access, None)))
}

/// Request guard for protected routes.
///
/// Verifies the bearer access token, resolves the subject to a live
/// account, and inserts [`AuthUser`] into the request extensions.
pub async fn require_auth<R: UserRepository>(
    State(state): State<AuthState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_bearer(req.headers()).ok_or(AuthError::MissingToken)?;
    let claims = state.jwt.verify_kind(token, TokenKind::Access)?;

    let user = state
        .service
        .get_by_email(&claims.sub)
        .await
        .map_err(|_| AuthError::InvalidToken)?
        .ok_or(AuthError::InvalidToken)?;

    if !user.is_active {
        return Err(AuthError::InvalidToken);
    }

    req.extensions_mut().insert(AuthUser {
        id: user.id,
        email: user.email,
        is_admin: user.is_admin,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockUserRepository;
    use axum_helpers::JwtConfig;

    #[test]
    fn test_auth_state_clones_for_non_clone_repositories() {
        // The mock repository is not Clone; state cloning must not care.
        let state = AuthState {
            service: UserService::new(MockUserRepository::new()),
            jwt: JwtAuth::new(&JwtConfig::new("test-secret-that-is-long-enough-32ch")),
        };
        let cloned = state.clone();
        drop(state);
        let _ = router(cloned);
    }

    #[test]
    fn test_can_access_own_resources() {
        let id = RecordId::generate();
        let user = AuthUser {
            id: id.clone(),
            email: "me@example.com".to_string(),
            is_admin: false,
        };
        assert!(user.can_access(&id));
        assert!(!user.can_access(&RecordId::generate()));
    }

    #[test]
    fn test_admin_can_access_anything() {
        let admin = AuthUser {
            id: RecordId::generate(),
            email: "root@example.com".to_string(),
            is_admin: true,
        };
        assert!(admin.can_access(&RecordId::generate()));
    }
}
