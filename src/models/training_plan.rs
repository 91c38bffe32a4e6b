use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::Mesocycle;

/// Version assigned to every freshly generated plan.
pub const INITIAL_PLAN_VERSION: i32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrainingPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_data: Json<Mesocycle>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns a plan listing may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlanSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Version,
}

impl PlanSortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(PlanSortField::CreatedAt),
            "updated_at" => Some(PlanSortField::UpdatedAt),
            "version" => Some(PlanSortField::Version),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            PlanSortField::CreatedAt => "created_at",
            PlanSortField::UpdatedAt => "updated_at",
            PlanSortField::Version => "version",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanListQuery {
    pub limit: i64,
    pub sort_by: PlanSortField,
    pub ascending: bool,
}

impl PlanListQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;
}

impl Default for PlanListQuery {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            sort_by: PlanSortField::CreatedAt,
            ascending: false,
        }
    }
}
