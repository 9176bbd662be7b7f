//! Router composition: domain routers, auth guard, docs, middleware.

use axum::{Router, middleware};
use axum_helpers::JwtAuth;
use domain_tasks::{InMemoryTaskRepository, TaskService};
use domain_users::{AuthState, InMemoryUserRepository, UserService, require_auth};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::openapi::ApiDoc;

/// Build the full application router.
///
/// `/auth/*` and `POST /users/create` are public; everything else under
/// `/users` and `/tasks` sits behind the bearer-token guard. The user
/// repository is shared so task ownership checks see the same accounts.
pub fn build(
    config: &Config,
    users: InMemoryUserRepository,
    tasks: InMemoryTaskRepository,
) -> Router {
    let user_service = UserService::new(users.clone());
    let task_service = Arc::new(TaskService::new(tasks, users));

    let auth_state = AuthState {
        service: user_service.clone(),
        jwt: JwtAuth::new(&config.jwt),
    };
    let user_service = Arc::new(user_service);

    let protected = Router::new()
        .nest("/users", domain_users::handlers::router(user_service.clone()))
        .nest("/tasks", domain_tasks::handlers::router(task_service))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth::<InMemoryUserRepository>,
        ));

    Router::new()
        .nest("/auth", domain_users::auth::router(auth_state))
        .nest("/users", domain_users::handlers::signup_router(user_service))
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(axum_helpers::errors::handlers::not_found)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum_helpers::JwtConfig;
    use core_config::{Environment, server::ServerConfig};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_config() -> Config {
        Config {
            server: ServerConfig::default(),
            jwt: JwtConfig::new("integration-test-secret-with-32-chars!"),
            environment: Environment::Development,
        }
    }

    fn test_app() -> Router {
        build(
            &test_config(),
            InMemoryUserRepository::new(),
            InMemoryTaskRepository::new(),
        )
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Sign up and log in, returning an access token.
    async fn signup_and_login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/users/create",
                json!({
                    "first_names": "End To End",
                    "last_names": "Tester",
                    "email": "e2e@example.com",
                    "password": "a-strong-password"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/login",
                json!({"email": "e2e@example.com", "password": "a-strong-password"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response.into_body()).await;
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = test_app();

        let response = app
            .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_signup_login_create_task_flow() {
        let app = test_app();
        let token = signup_and_login(&app).await;

        let mut request = post_json("/tasks/create", json!({"title": "First real task"}));
        request
            .headers_mut()
            .insert("authorization", format!("Bearer {token}").parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let task = json_body(response.into_body()).await;
        assert_eq!(task["title"], "First real task");
        assert_eq!(task["level"], 1);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/tasks")
                    .header("authorization", "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_returns_structured_404() {
        let app = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response.into_body()).await;
        assert_eq!(body["error"], "NOT_FOUND");
    }
}
