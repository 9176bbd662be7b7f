use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Aggregated OpenAPI documentation for the whole API.
///
/// Each domain crate ships its own `ApiDoc`; this nests them under the
/// same path prefixes the router mounts them at.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "TaskHub API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Multi-tenant hierarchical task management API"
    ),
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    nest(
        (path = "/auth", api = domain_users::auth::ApiDoc),
        (path = "/users", api = domain_users::handlers::ApiDoc),
        (path = "/tasks", api = domain_tasks::handlers::ApiDoc)
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
