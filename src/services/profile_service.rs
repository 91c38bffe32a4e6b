use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::{Profile, UpdateProfileRequest, DEFAULT_PROFILE_AGE};

const PROFILE_COLUMNS: &str = "id, user_id, age, weight, body_fat, training_goal, \
     training_experience_years, training_experience_months, injuries, updated_at";

/// Read/write access to user profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError>;

    /// Create the profile on first write, otherwise update only supplied fields.
    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, StorageError>;
}

#[derive(Debug, Clone)]
pub struct ProfileService {
    db: PgPool,
}

impl ProfileService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfileStore for ProfileService {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(profile)
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, StorageError> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (
                user_id, age, weight, body_fat, training_goal,
                training_experience_years, training_experience_months, injuries, updated_at
            )
            VALUES ($1, COALESCE($2, $9), $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET age = COALESCE($2, profiles.age),
                weight = COALESCE($3, profiles.weight),
                body_fat = COALESCE($4, profiles.body_fat),
                training_goal = COALESCE($5, profiles.training_goal),
                training_experience_years = COALESCE($6, profiles.training_experience_years),
                training_experience_months = COALESCE($7, profiles.training_experience_months),
                injuries = COALESCE($8, profiles.injuries),
                updated_at = NOW()
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(update.age)
        .bind(update.weight)
        .bind(update.body_fat)
        .bind(&update.training_goal)
        .bind(update.training_experience_years)
        .bind(update.training_experience_months)
        .bind(&update.injuries)
        .bind(DEFAULT_PROFILE_AGE)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(user_id = %user_id, "Profile saved");

        Ok(profile)
    }
}
