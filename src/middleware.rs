// CORS middleware

use tower_http::cors::{Any, CorsLayer};

/// Create CORS middleware layer
///
/// Configures CORS to allow all origins, methods, and headers, so browser
/// clients can call the relay from any page. Handles OPTIONS preflight
/// requests automatically.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
