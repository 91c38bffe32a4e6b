#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use ai_trainer::api::{create_routes, AppServices};
use ai_trainer::auth::JwtService;
use ai_trainer::errors::StorageError;
use ai_trainer::models::{
    ActivityType, Mesocycle, PlanListQuery, PlanSortField, Profile, TrainingPlan,
    UpdateProfileRequest, DEFAULT_PROFILE_AGE, INITIAL_PLAN_VERSION,
};
use ai_trainer::services::{GenerationError, PlanGenerator, PlanStore, ProfileStore};
use ai_trainer::models::ValidatedProfile;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::types::Json;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";
pub const TEST_AUDIENCE: &str = "authenticated";

pub fn jwt_service() -> JwtService {
    JwtService::new(TEST_JWT_SECRET, TEST_AUDIENCE)
}

pub fn bearer_token(user_id: Uuid) -> String {
    jwt_service()
        .issue_token(user_id, Some("athlete@example.com"), Duration::hours(1))
        .expect("token")
}

pub fn sample_mesocycle_json() -> Value {
    json!({
        "name": "Hypertrophy Block",
        "goal": "Hypertrophy",
        "duration_weeks": 8,
        "philosophy": "Progressive overload with controlled tempo",
        "weekly_structure": "Upper/Lower, 4 days",
        "introduction": "Warm up thoroughly before each session.",
        "final_notes": ["Prioritise sleep", "Deload if joints ache"],
        "phases": [{
            "phase_number": 1,
            "name": "Accumulation",
            "weeks": "1-4",
            "goal": "Build volume",
            "weekly_split": [{
                "day_number": 1,
                "focus": "Upper",
                "exercise_groups": [{
                    "group_id": "A",
                    "method": "Superset",
                    "exercises": [
                        {
                            "exercise_id": "A1",
                            "name": "Bench Press",
                            "sets": 4,
                            "reps": "8-10",
                            "tempo": "31X0",
                            "rest": "90s"
                        },
                        {
                            "exercise_id": "A2",
                            "name": "Chest Supported Row",
                            "sets": 4,
                            "reps": "10-12",
                            "tempo": "2011",
                            "rest": "90s",
                            "notes": "Pause at the top"
                        }
                    ]
                }]
            }]
        }]
    })
}

pub fn sample_mesocycle() -> Mesocycle {
    serde_json::from_value(sample_mesocycle_json()).expect("fixture matches the plan schema")
}

pub fn complete_profile(user_id: Uuid) -> Profile {
    let mut profile = Profile::new(user_id);
    profile.age = Some(28);
    profile.training_goal = Some("hypertrophy".to_string());
    profile.weight = Some(82.5);
    profile
}

/// In-memory profile store.
#[derive(Default)]
pub struct InMemoryProfiles {
    pub profiles: Mutex<Vec<Profile>>,
    pub fail_reads: Mutex<bool>,
}

impl InMemoryProfiles {
    pub fn with(profile: Profile) -> Self {
        let store = Self::default();
        store.profiles.lock().unwrap().push(profile);
        store
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfiles {
    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(StorageError::Unavailable("profiles offline".to_string()));
        }
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, StorageError> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(existing) = profiles.iter_mut().find(|p| p.user_id == user_id) {
            existing.apply(update);
            return Ok(existing.clone());
        }

        let mut profile = Profile::new(user_id);
        profile.apply(update);
        profile.age.get_or_insert(DEFAULT_PROFILE_AGE);
        profiles.push(profile.clone());
        Ok(profile)
    }
}

/// In-memory plan store with switchable failures.
#[derive(Default)]
pub struct InMemoryPlans {
    pub plans: Mutex<Vec<TrainingPlan>>,
    pub activities: Mutex<Vec<(Uuid, Option<Uuid>, ActivityType, Option<String>)>>,
    pub fail_inserts: Mutex<bool>,
    pub fail_logging: Mutex<bool>,
}

impl InMemoryPlans {
    pub fn insert_at(&self, user_id: Uuid, minutes_ago: i64) -> TrainingPlan {
        let timestamp = Utc::now() - Duration::minutes(minutes_ago);
        let plan = TrainingPlan {
            id: Uuid::new_v4(),
            user_id,
            plan_data: Json(sample_mesocycle()),
            version: INITIAL_PLAN_VERSION,
            created_at: timestamp,
            updated_at: timestamp,
        };
        self.plans.lock().unwrap().push(plan.clone());
        plan
    }

    pub fn activity_count(&self) -> usize {
        self.activities.lock().unwrap().len()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlans {
    async fn save_plan(&self, user_id: Uuid, mesocycle: &Mesocycle) -> Result<TrainingPlan, StorageError> {
        if *self.fail_inserts.lock().unwrap() {
            return Err(StorageError::Unavailable("insert rejected".to_string()));
        }
        let now = Utc::now();
        let plan = TrainingPlan {
            id: Uuid::new_v4(),
            user_id,
            plan_data: Json(mesocycle.clone()),
            version: INITIAL_PLAN_VERSION,
            created_at: now,
            updated_at: now,
        };
        self.plans.lock().unwrap().push(plan.clone());
        Ok(plan)
    }

    async fn log_activity(
        &self,
        user_id: Uuid,
        plan_id: Option<Uuid>,
        activity_type: ActivityType,
        description: Option<String>,
    ) -> Result<(), StorageError> {
        if *self.fail_logging.lock().unwrap() {
            return Err(StorageError::Unavailable("activity log offline".to_string()));
        }
        self.activities
            .lock()
            .unwrap()
            .push((user_id, plan_id, activity_type, description));
        Ok(())
    }

    async fn list_plans(&self, user_id: Uuid, query: PlanListQuery) -> Result<Vec<TrainingPlan>, StorageError> {
        let mut plans: Vec<TrainingPlan> = self
            .plans
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();

        plans.sort_by(|a, b| {
            let ordering = match query.sort_by {
                PlanSortField::CreatedAt => a.created_at.cmp(&b.created_at),
                PlanSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
                PlanSortField::Version => a.version.cmp(&b.version),
            };
            if query.ascending { ordering } else { ordering.reverse() }
        });
        plans.truncate(query.limit as usize);
        Ok(plans)
    }

    async fn get_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<Option<TrainingPlan>, StorageError> {
        Ok(self
            .plans
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == plan_id && p.user_id == user_id)
            .cloned())
    }

    async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> Result<bool, StorageError> {
        let mut plans = self.plans.lock().unwrap();
        let before = plans.len();
        plans.retain(|p| !(p.id == plan_id && p.user_id == user_id));
        Ok(plans.len() < before)
    }
}

/// Generator returning a fixed outcome and counting calls.
pub struct StubGenerator {
    pub outcome: fn() -> Result<Mesocycle, GenerationError>,
    pub calls: Mutex<usize>,
}

impl StubGenerator {
    pub fn succeeding() -> Self {
        Self {
            outcome: || Ok(sample_mesocycle()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(outcome: fn() -> Result<Mesocycle, GenerationError>) -> Self {
        Self {
            outcome,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PlanGenerator for StubGenerator {
    async fn generate(&self, _profile: &ValidatedProfile) -> Result<Mesocycle, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        (self.outcome)()
    }
}

pub struct TestApp {
    pub router: Router,
    pub profiles: Arc<InMemoryProfiles>,
    pub plans: Arc<InMemoryPlans>,
    pub generator: Arc<StubGenerator>,
}

impl TestApp {
    pub fn new(profiles: InMemoryProfiles, generator: StubGenerator) -> Self {
        let profiles = Arc::new(profiles);
        let plans = Arc::new(InMemoryPlans::default());
        let generator = Arc::new(generator);

        let services = AppServices {
            profiles: profiles.clone(),
            plans: plans.clone(),
            generator: generator.clone(),
            db: None,
        };

        Self {
            router: create_routes(services, jwt_service()),
            profiles,
            plans,
            generator,
        }
    }
}

pub fn authenticated_request(method: Method, uri: &str, body: Option<Value>, user_id: Uuid) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token(user_id)));

    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("JSON body")
}
