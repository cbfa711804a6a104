//! OpenAPI specification definition.
//!
//! Aggregates the diagram route handlers for OpenAPI documentation generation.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Diagrams
        crate::routes::diagrams::list_diagrams,
        crate::routes::diagrams::create_diagram,
        crate::routes::diagrams::get_diagram,
        crate::routes::diagrams::update_diagram,
        crate::routes::diagrams::delete_diagram,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Diagrams", description = "Owner-scoped diagram storage"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Diagram Store API",
        description = "REST API persisting node/edge diagrams for the sketch canvas",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
