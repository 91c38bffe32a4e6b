use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Age stored when a profile is first written without one.
pub const DEFAULT_PROFILE_AGE: i32 = 30;

/// Per-user physical and training attributes. One row per user.
///
/// `age` is nullable in storage so that a partially filled profile can exist;
/// plan generation refuses such profiles through the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub age: Option<i32>,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    pub training_goal: Option<String>,
    pub training_experience_years: Option<i32>,
    pub training_experience_months: Option<i32>,
    pub injuries: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Empty profile for `user_id`, used by tests and in-memory stores.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            age: None,
            weight: None,
            body_fat: None,
            training_goal: None,
            training_experience_years: None,
            training_experience_months: None,
            injuries: None,
            updated_at: Utc::now(),
        }
    }

    /// Apply a partial update; fields absent from the request keep their value.
    pub fn apply(&mut self, update: &UpdateProfileRequest) {
        if let Some(age) = update.age {
            self.age = Some(age);
        }
        if let Some(weight) = update.weight {
            self.weight = Some(weight);
        }
        if let Some(body_fat) = update.body_fat {
            self.body_fat = Some(body_fat);
        }
        if let Some(goal) = &update.training_goal {
            self.training_goal = Some(goal.clone());
        }
        if let Some(years) = update.training_experience_years {
            self.training_experience_years = Some(years);
        }
        if let Some(months) = update.training_experience_months {
            self.training_experience_months = Some(months);
        }
        if let Some(injuries) = &update.injuries {
            self.injuries = Some(injuries.clone());
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    #[validate(range(min = 1.0, max = 500.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub body_fat: Option<f64>,
    #[validate(length(min = 1, max = 500))]
    pub training_goal: Option<String>,
    #[validate(range(min = 0, max = 80))]
    pub training_experience_years: Option<i32>,
    #[validate(range(min = 0, max = 11))]
    pub training_experience_months: Option<i32>,
    #[validate(length(max = 2000))]
    pub injuries: Option<String>,
}

/// A profile that passed the required-field contract for plan generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProfile {
    pub user_id: Uuid,
    pub age: i32,
    pub training_goal: String,
    pub weight: Option<f64>,
    pub body_fat: Option<f64>,
    pub training_experience_years: Option<i32>,
    pub training_experience_months: Option<i32>,
    pub injuries: Option<String>,
}
