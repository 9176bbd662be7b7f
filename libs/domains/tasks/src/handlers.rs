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
use domain_users::{AuthUser, UserRepository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Priority, Task, TaskFilter, UpdateTask};
use crate::repository::TaskRepository;
use crate::service::TaskService;

pub const TAG: &str = "tasks";

/// OpenAPI documentation for the Tasks API
#[derive(OpenApi)]
#[openapi(
    paths(create_task, list_tasks, get_task, update_task, delete_task),
    components(
        schemas(Task, CreateTask, UpdateTask, TaskFilter, Priority),
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
        (name = TAG, description = "Hierarchical task endpoints")
    )
)]
pub struct ApiDoc;

/// Create the task router. All routes expect [`AuthUser`] to have been
/// inserted by the auth middleware.
pub fn router<T, U>(service: Arc<TaskService<T, U>>) -> Router
where
    T: TaskRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route("/", get(list_tasks))
        .route("/create", post(create_task))
        .route(
            "/{id}",
            get(get_task)
                .put(update_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(service)
}

/// Create a new task
#[utoipa::path(
    post,
    path = "/create",
    tag = TAG,
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task created successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn create_task<T: TaskRepository, U: UserRepository>(
    State(service): State<Arc<TaskService<T, U>>>,
    Extension(caller): Extension<AuthUser>,
    ValidatedJson(input): ValidatedJson<CreateTask>,
) -> TaskResult<impl IntoResponse> {
    // Tasks default to the caller; only administrators may assign others.
    let owner_id = match input.user_id {
        Some(ref user_id) if user_id != &caller.id && !caller.is_admin => {
            return Err(TaskError::Forbidden(
                "Cannot create tasks for another user".to_string(),
            ));
        }
        Some(ref user_id) => user_id.clone(),
        None => caller.id.clone(),
    };

    let task = service.create_task(owner_id, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// List tasks. Non-administrators only ever see their own.
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(TaskFilter),
    responses(
        (status = 200, description = "List of tasks", body = Vec<Task>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn list_tasks<T: TaskRepository, U: UserRepository>(
    State(service): State<Arc<TaskService<T, U>>>,
    Extension(caller): Extension<AuthUser>,
    Query(mut filter): Query<TaskFilter>,
) -> TaskResult<Json<Vec<Task>>> {
    if !caller.is_admin {
        filter.user_id = Some(caller.id.clone());
    }

    let tasks = service.list_tasks(filter).await?;
    Ok(Json(tasks))
}

/// Get a task by ID (owner or administrator)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 400, response = BadRequestIdResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn get_task<T: TaskRepository, U: UserRepository>(
    State(service): State<Arc<TaskService<T, U>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> TaskResult<Json<Task>> {
    let task = service.get_task(&id).await?;
    ensure_owner(&caller, &task)?;
    Ok(Json(task))
}

/// Update a task (owner or administrator). Absent fields are unchanged,
/// so the same endpoint serves PUT and PATCH.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    request_body = UpdateTask,
    responses(
        (status = 200, description = "Task updated successfully", body = Task),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn update_task<T: TaskRepository, U: UserRepository>(
    State(service): State<Arc<TaskService<T, U>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateTask>,
) -> TaskResult<Json<Task>> {
    let task = service.get_task(&id).await?;
    ensure_owner(&caller, &task)?;

    let updated = service.update_task(&id, input).await?;
    Ok(Json(updated))
}

/// Delete a task (owner or administrator)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "Task ID")
    ),
    responses(
        (status = 204, description = "Task deleted successfully"),
        (status = 400, response = BadRequestIdResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
async fn delete_task<T: TaskRepository, U: UserRepository>(
    State(service): State<Arc<TaskService<T, U>>>,
    Extension(caller): Extension<AuthUser>,
    IdPath(id): IdPath,
) -> TaskResult<impl IntoResponse> {
    let task = service.get_task(&id).await?;
    ensure_owner(&caller, &task)?;

    service.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_owner(caller: &AuthUser, task: &Task) -> TaskResult<()> {
    if !caller.can_access(&task.user_id) {
        return Err(TaskError::Forbidden(
            "Cannot access another user's task".to_string(),
        ));
    }
    Ok(())
}
