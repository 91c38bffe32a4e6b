// Verification of sessions issued by the external identity provider

pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use errors::AuthError;
pub use jwt::JwtService;
pub use middleware::require_session;
pub use models::{Claims, UserSession};
