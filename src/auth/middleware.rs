use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::{AuthError, JwtService};

/// Bearer-token authentication middleware.
///
/// On success the caller's `UserSession` is available to handlers through
/// `Extension<UserSession>`.
pub async fn require_session(
    State(jwt_service): State<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !request.headers().contains_key(AUTHORIZATION) {
        return Err(AuthError::MissingAuthHeader);
    }

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AuthError::InvalidAuthHeaderFormat)?;

    let session = jwt_service.extract_user_session(bearer.token())?;

    tracing::debug!(user_id = %session.user_id, "Authenticated request");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// CORS configuration for browser clients
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Security headers middleware
pub fn security_headers_layer() -> tower_http::set_header::SetResponseHeaderLayer<axum::http::HeaderValue> {
    tower_http::set_header::SetResponseHeaderLayer::overriding(
        axum::http::header::X_CONTENT_TYPE_OPTIONS,
        axum::http::HeaderValue::from_static("nosniff"),
    )
}
