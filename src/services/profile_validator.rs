use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::models::{Profile, ValidatedProfile};
use crate::services::ProfileStore;

pub const MIN_AGE: i32 = 1;
pub const MAX_AGE: i32 = 120;
pub const MAX_EXPERIENCE_MONTHS: i32 = 11;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("User profile not found")]
    ProfileNotFound,
    #[error("User profile is incomplete: {}", missing_fields.join(", "))]
    ProfileIncomplete { missing_fields: Vec<String> },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Checks a stored profile against the fields plan generation depends on.
#[derive(Clone)]
pub struct ProfileValidator {
    profiles: Arc<dyn ProfileStore>,
}

impl ProfileValidator {
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Fetch and check the profile for `user_id`. Read-only.
    pub async fn validate_profile(&self, user_id: Uuid) -> Result<ValidatedProfile, ValidationError> {
        let profile = self
            .profiles
            .get_profile(user_id)
            .await?
            .ok_or(ValidationError::ProfileNotFound)?;

        check_required_fields(profile)
            .map_err(|missing_fields| ValidationError::ProfileIncomplete { missing_fields })
    }
}

/// Apply the required-field contract. On failure returns the names of the
/// offending top-level fields, in declaration order.
///
/// Optional attributes may be absent, but a stored value outside its range
/// is reported like a missing required field.
pub fn check_required_fields(profile: Profile) -> Result<ValidatedProfile, Vec<String>> {
    let mut missing = Vec::new();

    let age = profile.age.filter(|age| (MIN_AGE..=MAX_AGE).contains(age));
    if age.is_none() {
        missing.push("age".to_string());
    }

    if profile.weight.is_some_and(|weight| weight.is_nan() || weight <= 0.0) {
        missing.push("weight".to_string());
    }

    let training_goal = profile
        .training_goal
        .map(|goal| goal.trim().to_string())
        .filter(|goal| !goal.is_empty());
    if training_goal.is_none() {
        missing.push("training_goal".to_string());
    }

    if profile.training_experience_years.is_some_and(|years| years < 0) {
        missing.push("training_experience_years".to_string());
    }

    if profile
        .training_experience_months
        .is_some_and(|months| !(0..=MAX_EXPERIENCE_MONTHS).contains(&months))
    {
        missing.push("training_experience_months".to_string());
    }

    match (age, training_goal) {
        (Some(age), Some(training_goal)) if missing.is_empty() => Ok(ValidatedProfile {
            user_id: profile.user_id,
            age,
            training_goal,
            weight: profile.weight,
            body_fat: profile.body_fat,
            training_experience_years: profile.training_experience_years,
            training_experience_months: profile.training_experience_months,
            injuries: profile.injuries,
        }),
        _ => Err(missing),
    }
}
