use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use sqlx::PgPool;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use super::error::handle_panic;
use super::health::health_check;
use super::training_plans::{training_plan_routes, TrainingPlanAppState};
use super::user_profile::user_profile_routes;
use crate::auth::middleware::{cors_layer, security_headers_layer};
use crate::auth::{require_session, JwtService};
use crate::services::{
    PlanGenerationService, PlanGenerator, PlanStore, ProfileService, ProfileStore,
    TrainingPlanService,
};

/// Everything the HTTP layer needs. Stores are trait objects so the router can
/// be assembled over Postgres or over in-memory doubles.
#[derive(Clone)]
pub struct AppServices {
    pub profiles: Arc<dyn ProfileStore>,
    pub plans: Arc<dyn PlanStore>,
    pub generator: Arc<dyn PlanGenerator>,
    pub db: Option<PgPool>,
}

impl AppServices {
    pub fn postgres(db: PgPool, generator: Arc<dyn PlanGenerator>) -> Self {
        Self {
            profiles: Arc::new(ProfileService::new(db.clone())),
            plans: Arc::new(TrainingPlanService::new(db.clone())),
            generator,
            db: Some(db),
        }
    }
}

pub fn create_routes(services: AppServices, jwt_service: JwtService) -> Router {
    let plan_generation_service = PlanGenerationService::new(
        services.profiles.clone(),
        services.generator.clone(),
        services.plans.clone(),
    );

    let api_v1 = Router::new()
        .merge(training_plan_routes(TrainingPlanAppState {
            plan_generation_service,
            plans: services.plans.clone(),
        }))
        .merge(user_profile_routes(services.profiles.clone()))
        .route_layer(middleware::from_fn_with_state(jwt_service, require_session));

    Router::new()
        .route("/health", get(health_check).with_state(services.db))
        .nest("/api/v1", api_v1)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(security_headers_layer())
        .layer(CatchPanicLayer::custom(handle_panic))
}
