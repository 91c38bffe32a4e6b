use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use validator::Validate;

use crate::api::error::ApiError;
use crate::auth::UserSession;
use crate::models::{Profile, UpdateProfileRequest};
use crate::services::ProfileStore;

#[derive(Clone)]
pub struct UserProfileAppState {
    pub profiles: Arc<dyn ProfileStore>,
}

pub fn user_profile_routes(profiles: Arc<dyn ProfileStore>) -> Router {
    let state = UserProfileAppState { profiles };

    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .with_state(state)
}

/// Get the authenticated user's profile
pub async fn get_profile(
    State(state): State<UserProfileAppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .profiles
        .get_profile(session.user_id)
        .await?
        .ok_or_else(ApiError::profile_not_found)?;

    Ok(Json(profile))
}

/// Create or partially update the authenticated user's profile
pub async fn update_profile(
    State(state): State<UserProfileAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateProfileRequest>, ApiError>,
) -> Result<Json<Profile>, ApiError> {
    request.validate()?;

    let profile = state
        .profiles
        .upsert_profile(session.user_id, &request)
        .await?;

    tracing::info!(user_id = %session.user_id, "Profile updated");

    Ok(Json(profile))
}
