//! CORS middleware configuration.

use tower_http::cors::CorsLayer;

/// Create a CORS layer with permissive settings.
///
/// The canvas is served from a different origin than the store, so every
/// origin, method and header is allowed.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::permissive()
}
