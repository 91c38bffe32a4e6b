use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::AiConfig;
use crate::models::{Mesocycle, ValidatedProfile};

/// Generation failure, classified where the external call is made.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Timeouts, connection failures, 5xx and rate limiting.
    #[error("AI service unavailable: {0}")]
    Unavailable(String),
    #[error("AI service rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("AI service returned an invalid plan: {0}")]
    InvalidResponse(String),
}

impl GenerationError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, GenerationError::Unavailable(_))
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Unavailable("request timed out".to_string())
        } else if err.is_connect() {
            GenerationError::Unavailable(format!("connection failed: {err}"))
        } else {
            GenerationError::Unavailable(format!("transport error: {err}"))
        }
    }

    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_string(), |e| e.message);

        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            GenerationError::Unavailable(format!("{status}: {message}"))
        } else {
            GenerationError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}

/// Produces a training plan for a validated profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, profile: &ValidatedProfile) -> Result<Mesocycle, GenerationError>;
}

/// Deterministic prompt for `profile`. Absent optional values are spelled out
/// so the model never sees an empty slot.
pub fn build_prompt(profile: &ValidatedProfile) -> String {
    let weight = describe_measure(profile.weight);
    let body_fat = describe_measure(profile.body_fat);
    let injuries = profile
        .injuries
        .as_deref()
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or("None");

    format!(
        "You are an expert fitness trainer. Create a detailed training plan based on the following user profile:\n\
         - Age: {age}\n\
         - Weight: {weight}\n\
         - Body fat: {body_fat}\n\
         - Training goal: {goal}\n\
         - Experience: {years} years, {months} months\n\
         - Injuries/limitations: {injuries}\n\
         \n\
         Create a comprehensive mesocycle training plan with detailed phases, exercises, and structured workout days.",
        age = profile.age,
        goal = profile.training_goal,
        years = profile.training_experience_years.unwrap_or(0),
        months = profile.training_experience_months.unwrap_or(0),
    )
}

/// A zero or non-numeric measurement reads as unrecorded.
fn describe_measure(value: Option<f64>) -> String {
    value
        .filter(|v| *v != 0.0 && !v.is_nan())
        .map_or_else(|| "Not specified".to_string(), |v| v.to_string())
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    candidate_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Plan generator backed by the Gemini `generateContent` endpoint with a
/// JSON response schema.
#[derive(Clone)]
pub struct GeminiPlanGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiPlanGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiPlanGenerator")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiPlanGenerator {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(prompt: String) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(prompt) }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: Mesocycle::response_schema(),
                candidate_count: 1,
            },
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String, GenerationError> {
        let candidate = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| GenerationError::InvalidResponse("no candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::InvalidResponse(format!(
                "empty candidate (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }

    fn parse_mesocycle(text: &str) -> Result<Mesocycle, GenerationError> {
        let mesocycle: Mesocycle = serde_json::from_str(text)
            .map_err(|e| GenerationError::InvalidResponse(format!("plan does not match schema: {e}")))?;

        mesocycle
            .validate()
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(mesocycle)
    }
}

#[async_trait]
impl PlanGenerator for GeminiPlanGenerator {
    async fn generate(&self, profile: &ValidatedProfile) -> Result<Mesocycle, GenerationError> {
        let request = Self::build_request(build_prompt(profile));

        debug!(model = %self.model, user_id = %profile.user_id, "Requesting plan generation");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(GenerationError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(GenerationError::from_transport)?;

        if !status.is_success() {
            error!(status = %status, model = %self.model, "Plan generation request failed");
            return Err(GenerationError::from_status(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::InvalidResponse(format!("unreadable response: {e}")))?;
        let mesocycle = Self::parse_mesocycle(&Self::extract_text(parsed)?)?;

        info!(
            user_id = %profile.user_id,
            phases = mesocycle.phases.len(),
            "Plan generated"
        );

        Ok(mesocycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile() -> ValidatedProfile {
        ValidatedProfile {
            user_id: Uuid::new_v4(),
            age: 28,
            training_goal: "hypertrophy".to_string(),
            weight: None,
            body_fat: Some(18.5),
            training_experience_years: Some(2),
            training_experience_months: None,
            injuries: None,
        }
    }

    #[test]
    fn test_prompt_spells_out_missing_values() {
        let prompt = build_prompt(&profile());

        assert!(prompt.contains("- Age: 28\n"));
        assert!(prompt.contains("- Weight: Not specified\n"));
        assert!(prompt.contains("- Body fat: 18.5\n"));
        assert!(prompt.contains("- Training goal: hypertrophy\n"));
        assert!(prompt.contains("- Experience: 2 years, 0 months\n"));
        assert!(prompt.contains("- Injuries/limitations: None\n"));
    }

    #[test]
    fn test_prompt_treats_zero_measurements_as_unrecorded() {
        let mut profile = profile();
        profile.weight = Some(0.0);
        profile.body_fat = Some(0.0);
        let prompt = build_prompt(&profile);

        assert!(prompt.contains("- Weight: Not specified\n"));
        assert!(prompt.contains("- Body fat: Not specified\n"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let profile = profile();
        assert_eq!(build_prompt(&profile), build_prompt(&profile));
    }

    #[test]
    fn test_status_classification() {
        assert!(GenerationError::from_status(StatusCode::SERVICE_UNAVAILABLE, "").is_unavailable());
        assert!(GenerationError::from_status(StatusCode::TOO_MANY_REQUESTS, "").is_unavailable());
        assert!(!GenerationError::from_status(StatusCode::BAD_REQUEST, "").is_unavailable());
    }

    #[test]
    fn test_status_message_extracted_from_error_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        match GenerationError::from_status(StatusCode::BAD_REQUEST, body) {
            GenerationError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_request_carries_schema() {
        let request = serde_json::to_value(GeminiPlanGenerator::build_request("hi".into())).unwrap();
        assert_eq!(request["generation_config"]["response_mime_type"], "application/json");
        assert_eq!(request["generation_config"]["response_schema"]["title"], "Mesocycle");
        assert_eq!(request["contents"][0]["parts"][0]["text"], "hi");
    }
}
