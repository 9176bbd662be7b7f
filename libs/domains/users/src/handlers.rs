use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthUser;
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, UserFilter, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(create_user, list_users, get_user, update_user, delete_user),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, UserFilter),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User account endpoints")
    )
)]
pub struct ApiDoc;

/// Public router: account registration only
pub fn signup_router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    Router::new()
        .route("/create", post(create_user))
        .with_state(service)
}

/// Protected router: everything that requires an authenticated caller
pub fn router<R: UserRepository + 'static>(service: Arc<UserService<R>>) -> Router {
    Router::new()
        .route("/", get(list_users))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .with_state(service)
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List user accounts (administrators only)
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(UserFilter),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(caller): Extension<AuthUser>,
    Query(filter): Query<UserFilter>,
) -> UserResult<Json<Vec<UserResponse>>> {
    if !caller.is_admin {
        return Err(UserError::Forbidden(
            "Only administrators may list users".to_string(),
        ));
    }

    let users = service.list_users(filter).await?;
    Ok(Json(users))
}

/// Get a user by ID (self or administrator)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestIdResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> UserResult<Json<UserResponse>> {
    if !caller.can_access(&id) {
        return Err(UserError::Forbidden(
            "Cannot access another user's account".to_string(),
        ));
    }

    let user = service.get_user(&id).await?;
    Ok(Json(user))
}

/// Update a user (self or administrator). Absent fields are unchanged,
/// so the same endpoint serves PUT and PATCH.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    if !caller.can_access(&id) {
        return Err(UserError::Forbidden(
            "Cannot modify another user's account".to_string(),
        ));
    }

    // Privilege and activation flags are reserved for administrators.
    if !caller.is_admin && (input.is_admin.is_some() || input.is_active.is_some()) {
        return Err(UserError::Forbidden(
            "Only administrators may change account flags".to_string(),
        ));
    }

    let user = service.update_user(&id, input).await?;
    Ok(Json(user))
}

/// Delete a user (self or administrator)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted successfully"),
        (status = 400, response = BadRequestIdResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> UserResult<impl IntoResponse> {
    if !caller.can_access(&id) {
        return Err(UserError::Forbidden(
            "Cannot delete another user's account".to_string(),
        ));
    }

    service.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
