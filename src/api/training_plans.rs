use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::auth::UserSession;
use crate::models::{ActivityType, PlanListQuery, PlanSortField, TrainingPlan};
use crate::services::{PlanGenerationService, PlanStore};

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

impl PlanQuery {
    /// Resolve query defaults. Empty values fall back to the default and any
    /// `order` other than `asc` means descending.
    pub fn into_list_query(self) -> Result<PlanListQuery, ApiError> {
        let limit = match non_empty(&self.limit) {
            None => PlanListQuery::DEFAULT_LIMIT,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|limit| (1..=PlanListQuery::MAX_LIMIT).contains(limit))
                .ok_or_else(|| {
                    ApiError::invalid_request(format!(
                        "limit must be an integer between 1 and {}",
                        PlanListQuery::MAX_LIMIT
                    ))
                })?,
        };

        let sort_by = match non_empty(&self.sort_by) {
            None => PlanSortField::default(),
            Some(raw) => PlanSortField::parse(raw).ok_or_else(|| {
                ApiError::invalid_request("sortBy must be one of: created_at, updated_at, version")
            })?,
        };

        let ascending = self
            .order
            .as_deref()
            .map(|order| order.eq_ignore_ascii_case("asc"))
            .unwrap_or(false);

        Ok(PlanListQuery {
            limit,
            sort_by,
            ascending,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanListResponse {
    pub data: Vec<TrainingPlan>,
}

#[derive(Clone)]
pub struct TrainingPlanAppState {
    pub plan_generation_service: PlanGenerationService,
    pub plans: Arc<dyn PlanStore>,
}

pub fn training_plan_routes(state: TrainingPlanAppState) -> Router {
    Router::new()
        .route("/training-plans", get(list_plans).post(generate_plan))
        .route("/training-plans/:plan_id", get(get_plan).delete(delete_plan))
        .with_state(state)
}

/// Generate a new training plan for the authenticated user
pub async fn generate_plan(
    State(state): State<TrainingPlanAppState>,
    Extension(session): Extension<UserSession>,
) -> Result<(StatusCode, Json<TrainingPlan>), ApiError> {
    let plan = state
        .plan_generation_service
        .generate_plan(session.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

/// List the authenticated user's plans
pub async fn list_plans(
    State(state): State<TrainingPlanAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<PlanQuery>, ApiError>,
) -> Result<Json<PlanListResponse>, ApiError> {
    let query = query.into_list_query()?;
    let data = state.plans.list_plans(session.user_id, query).await?;

    Ok(Json(PlanListResponse { data }))
}

pub async fn get_plan(
    State(state): State<TrainingPlanAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(plan_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<TrainingPlan>, ApiError> {
    // The plan may have been deleted since it was listed
    let plan = state
        .plans
        .get_plan(session.user_id, plan_id)
        .await?
        .ok_or_else(ApiError::plan_not_found)?;

    Ok(Json(plan))
}

pub async fn delete_plan(
    State(state): State<TrainingPlanAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(plan_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    if !state.plans.delete_plan(session.user_id, plan_id).await? {
        return Err(ApiError::plan_not_found());
    }

    // The row is gone, so the log entry references it by description only
    if let Err(err) = state
        .plans
        .log_activity(
            session.user_id,
            None,
            ActivityType::DeletePlan,
            Some(format!("Plan {plan_id} deleted")),
        )
        .await
    {
        tracing::warn!(plan_id = %plan_id, error = %err, "Failed to record plan deletion activity");
    }

    tracing::info!(user_id = %session.user_id, plan_id = %plan_id, "Training plan deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn query(limit: Option<&str>, sort_by: Option<&str>, order: Option<&str>) -> PlanQuery {
        PlanQuery {
            limit: limit.map(str::to_string),
            sort_by: sort_by.map(str::to_string),
            order: order.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults() {
        let resolved = PlanQuery::default().into_list_query().unwrap();
        assert_eq!(resolved, PlanListQuery::default());
        assert_eq!(resolved.limit, 10);
        assert!(!resolved.ascending);
    }

    #[test]
    fn test_empty_values_use_defaults() {
        let resolved = query(Some(""), Some(""), Some("")).into_list_query().unwrap();
        assert_eq!(resolved, PlanListQuery::default());
    }

    #[test]
    fn test_order_other_than_asc_is_descending() {
        assert!(query(None, None, Some("ASC")).into_list_query().unwrap().ascending);
        assert!(!query(None, None, Some("sideways")).into_list_query().unwrap().ascending);
        assert!(!query(None, None, Some("desc")).into_list_query().unwrap().ascending);
    }

    #[test]
    fn test_rejects_unknown_sort_column() {
        let err = query(None, Some("plan_data; DROP TABLE"), None)
            .into_list_query()
            .unwrap_err();
        assert_eq!(err.error_code, ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_limit_bounds() {
        assert_eq!(query(Some("1"), None, None).into_list_query().unwrap().limit, 1);
        assert!(query(Some("0"), None, None).into_list_query().is_err());
        assert!(query(Some("101"), None, None).into_list_query().is_err());
        assert!(query(Some("ten"), None, None).into_list_query().is_err());
    }
}
