use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{ErrorCode, StorageError};
use crate::models::{ActivityType, TrainingPlan};

use super::plan_generator::{GenerationError, PlanGenerator};
use super::profile_validator::{ProfileValidator, ValidationError};
use super::{PlanStore, ProfileStore};

const CREATE_PLAN_DESCRIPTION: &str = "Plan created with AI";

/// Step of the generation workflow, used to tag failures in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Validating,
    Generating,
    Persisting,
}

/// Terminal failure of a generation run. `Validating` failures are
/// rejections; `Generating` and `Persisting` failures are faults.
#[derive(Error, Debug)]
pub enum PlanGenerationError {
    #[error("User profile not found")]
    ProfileNotFound,
    #[error("User profile is incomplete")]
    ProfileIncomplete { missing_fields: Vec<String> },
    #[error("Profile lookup failed: {0}")]
    ProfileStorage(#[source] StorageError),
    #[error("AI service is currently unavailable: {0}")]
    AiServiceUnavailable(#[source] GenerationError),
    #[error("Plan generation failed: {0}")]
    Generation(#[source] GenerationError),
    #[error("Failed to save the training plan: {0}")]
    Persistence(#[source] StorageError),
}

impl PlanGenerationError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            PlanGenerationError::ProfileNotFound => ErrorCode::ProfileNotFound,
            PlanGenerationError::ProfileIncomplete { .. } => ErrorCode::ProfileIncomplete,
            PlanGenerationError::ProfileStorage(_) | PlanGenerationError::Persistence(_) => {
                ErrorCode::DatabaseError
            }
            PlanGenerationError::AiServiceUnavailable(_) => ErrorCode::AiServiceUnavailable,
            PlanGenerationError::Generation(_) => ErrorCode::ServerError,
        }
    }

    pub fn stage(&self) -> GenerationStage {
        match self {
            PlanGenerationError::ProfileNotFound
            | PlanGenerationError::ProfileIncomplete { .. }
            | PlanGenerationError::ProfileStorage(_) => GenerationStage::Validating,
            PlanGenerationError::AiServiceUnavailable(_) | PlanGenerationError::Generation(_) => {
                GenerationStage::Generating
            }
            PlanGenerationError::Persistence(_) => GenerationStage::Persisting,
        }
    }

    /// Message safe to show to the end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            PlanGenerationError::ProfileNotFound => "User profile not found",
            PlanGenerationError::ProfileIncomplete { .. } => "User profile is incomplete",
            PlanGenerationError::ProfileStorage(_) => "Failed to load the user profile",
            PlanGenerationError::AiServiceUnavailable(_) => {
                "The AI service is currently unavailable. Please try again later."
            }
            PlanGenerationError::Generation(_) => "An unexpected error occurred during plan generation",
            PlanGenerationError::Persistence(_) => {
                "Failed to save the training plan. Please try again later."
            }
        }
    }
}

impl From<ValidationError> for PlanGenerationError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::ProfileNotFound => PlanGenerationError::ProfileNotFound,
            ValidationError::ProfileIncomplete { missing_fields } => {
                PlanGenerationError::ProfileIncomplete { missing_fields }
            }
            ValidationError::Storage(err) => PlanGenerationError::ProfileStorage(err),
        }
    }
}

impl From<GenerationError> for PlanGenerationError {
    fn from(err: GenerationError) -> Self {
        if err.is_unavailable() {
            PlanGenerationError::AiServiceUnavailable(err)
        } else {
            PlanGenerationError::Generation(err)
        }
    }
}

/// Runs validate → generate → persist → log for one user, stopping at the
/// first failure. No retries, no deduplication of concurrent runs.
#[derive(Clone)]
pub struct PlanGenerationService {
    validator: ProfileValidator,
    generator: Arc<dyn PlanGenerator>,
    plans: Arc<dyn PlanStore>,
}

impl PlanGenerationService {
    pub fn new(
        profiles: Arc<dyn ProfileStore>,
        generator: Arc<dyn PlanGenerator>,
        plans: Arc<dyn PlanStore>,
    ) -> Self {
        Self {
            validator: ProfileValidator::new(profiles),
            generator,
            plans,
        }
    }

    #[instrument(skip(self))]
    pub async fn generate_plan(&self, user_id: Uuid) -> Result<TrainingPlan, PlanGenerationError> {
        let profile = self.validator.validate_profile(user_id).await.map_err(|err| {
            let err = PlanGenerationError::from(err);
            info!(code = %err.error_code(), "Plan generation rejected: {}", err);
            err
        })?;

        let mesocycle = self
            .generator
            .generate(&profile)
            .await
            .map_err(|err| self.failed(PlanGenerationError::from(err)))?;

        let plan = self
            .plans
            .save_plan(user_id, &mesocycle)
            .await
            .map_err(|err| {
                let transient = err.is_transient();
                let err = self.failed(PlanGenerationError::Persistence(err));
                warn!(transient, "Training plan was not stored");
                err
            })?;

        // Logging never decides the outcome of the run
        if let Err(err) = self
            .plans
            .log_activity(
                user_id,
                Some(plan.id),
                ActivityType::CreatePlan,
                Some(CREATE_PLAN_DESCRIPTION.to_string()),
            )
            .await
        {
            warn!(plan_id = %plan.id, error = %err, "Failed to record plan creation activity");
        }

        info!(plan_id = %plan.id, "Training plan created");

        Ok(plan)
    }

    fn failed(&self, err: PlanGenerationError) -> PlanGenerationError {
        tracing::error!(
            stage = ?err.stage(),
            code = %err.error_code(),
            "Plan generation failed: {}",
            err
        );
        err
    }
}
