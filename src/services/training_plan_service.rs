use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::{ActivityType, Mesocycle, PlanListQuery, TrainingPlan, INITIAL_PLAN_VERSION};

const PLAN_COLUMNS: &str = "id, user_id, plan_data, version, created_at, updated_at";

/// Persistence for generated plans and the activity log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Insert a new plan at version 1 and return the stored row.
    async fn save_plan(&self, user_id: Uuid, mesocycle: &Mesocycle) -> Result<TrainingPlan, StorageError>;

    async fn log_activity(
        &self,
        user_id: Uuid,
        plan_id: Option<Uuid>,
        activity_type: ActivityType,
        description: Option<String>,
    ) -> Result<(), StorageError>;

    async fn list_plans(&self, user_id: Uuid, query: PlanListQuery) -> Result<Vec<TrainingPlan>, StorageError>;

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<TrainingPlan>, StorageError>;

    /// Returns `false` when no plan with that id belongs to the user.
    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StorageError>;
}

#[derive(Debug, Clone)]
pub struct TrainingPlanService {
    db: PgPool,
}

impl TrainingPlanService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlanStore for TrainingPlanService {
    async fn save_plan(&self, user_id: Uuid, mesocycle: &Mesocycle) -> Result<TrainingPlan, StorageError> {
        let plan = sqlx::query_as::<_, TrainingPlan>(&format!(
            r#"
            INSERT INTO training_plans (user_id, plan_data, version, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(Json(mesocycle))
        .bind(INITIAL_PLAN_VERSION)
        .fetch_one(&self.db)
        .await?;

        Ok(plan)
    }

    async fn log_activity(
        &self,
        user_id: Uuid,
        plan_id: Option<Uuid>,
        activity_type: ActivityType,
        description: Option<String>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO activity_logs (user_id, plan_id, activity_type, description, created_at)
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(user_id)
        .bind(plan_id)
        .bind(activity_type.as_str())
        .bind(description)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn list_plans(&self, user_id: Uuid, query: PlanListQuery) -> Result<Vec<TrainingPlan>, StorageError> {
        // Sort column comes from a closed enum, never from raw input
        let direction = if query.ascending { "ASC" } else { "DESC" };
        let plans = sqlx::query_as::<_, TrainingPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM training_plans WHERE user_id = $1 ORDER BY {} {direction}, id {direction} LIMIT $2",
            query.sort_by.column()
        ))
        .bind(user_id)
        .bind(query.limit)
        .fetch_all(&self.db)
        .await?;

        Ok(plans)
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<TrainingPlan>, StorageError> {
        let plan = sqlx::query_as::<_, TrainingPlan>(&format!(
            "SELECT {PLAN_COLUMNS} FROM training_plans WHERE id = $1 AND user_id = $2"
        ))
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(plan)
    }

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM training_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id)
            .bind(user_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
