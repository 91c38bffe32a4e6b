use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::config::check_database;

/// Liveness probe. When a pool is configured the database is pinged too.
pub async fn health_check(State(db): State<Option<PgPool>>) -> (StatusCode, Json<Value>) {
    let database = check_database(db.as_ref()).await;

    let (status, label) = if database.is_healthy() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(json!({
            "status": label,
            "service": "ai-trainer",
            "version": env!("CARGO_PKG_VERSION"),
            "database": database.as_str(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
