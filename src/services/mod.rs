// Business logic services

pub mod plan_generation_service;
pub mod plan_generator;
pub mod profile_service;
pub mod profile_validator;
pub mod training_plan_service;

pub use plan_generation_service::{GenerationStage, PlanGenerationError, PlanGenerationService};
pub use plan_generator::{build_prompt, GeminiPlanGenerator, GenerationError, PlanGenerator};
pub use profile_service::{ProfileService, ProfileStore};
pub use profile_validator::{check_required_fields, ProfileValidator, ValidationError};
pub use training_plan_service::{PlanStore, TrainingPlanService};

#[cfg(test)]
pub use plan_generator::MockPlanGenerator;
#[cfg(test)]
pub use profile_service::MockProfileStore;
#[cfg(test)]
pub use training_plan_service::MockPlanStore;
