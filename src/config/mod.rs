// Environment-driven configuration

pub mod ai;
pub mod app;
pub mod database;

pub use ai::AiConfig;
pub use app::AppConfig;
pub use database::{check_database, run_migrations, DatabaseConfig, DatabaseHealth};
