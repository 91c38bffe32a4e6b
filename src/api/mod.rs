// HTTP routes and handlers

pub mod error;
pub mod health;
pub mod routes;
pub mod training_plans;
pub mod user_profile;

pub use error::ApiError;
pub use routes::{create_routes, AppServices};
