use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const MESOCYCLE_SCHEMA_NAME: &str = "Mesocycle";
pub const MESOCYCLE_SCHEMA_DESCRIPTION: &str =
    "Structured training plan with phases, workout days, and exercises";

/// A multi-week training program made of sequential phases.
///
/// This is the document stored in `training_plans.plan_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesocycle {
    pub name: String,
    pub goal: String,
    pub duration_weeks: i32,
    pub philosophy: String,
    pub weekly_structure: String,
    pub introduction: String,
    pub final_notes: Vec<String>,
    pub phases: Vec<TrainingPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPhase {
    pub phase_number: i32,
    pub name: String,
    /// Week range, e.g. "1-4".
    pub weeks: String,
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub weekly_split: Vec<WorkoutDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDay {
    pub day_number: i32,
    pub focus: String,
    pub exercise_groups: Vec<ExerciseGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGroup {
    pub group_id: String,
    pub method: ExerciseMethod,
    pub exercises: Vec<ExerciseDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
    pub exercise_id: String,
    pub name: String,
    pub sets: i32,
    /// Free-form so ranges and annotations fit ("10-12", "AMRAP >8").
    pub reps: String,
    pub tempo: String,
    pub rest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Method applied to an exercise group. Unknown methods are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExerciseMethod {
    Standard,
    Superset,
    GiantSet,
    TriSet,
    DropSet,
    Other(String),
}

impl ExerciseMethod {
    pub fn as_str(&self) -> &str {
        match self {
            ExerciseMethod::Standard => "Standard",
            ExerciseMethod::Superset => "Superset",
            ExerciseMethod::GiantSet => "Giant Set",
            ExerciseMethod::TriSet => "Tri-Set",
            ExerciseMethod::DropSet => "Drop Set",
            ExerciseMethod::Other(method) => method,
        }
    }
}

impl From<String> for ExerciseMethod {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Standard" => ExerciseMethod::Standard,
            // "Superseria" is the label older plans were generated with
            "Superset" | "Superseria" => ExerciseMethod::Superset,
            "Giant Set" => ExerciseMethod::GiantSet,
            "Tri-Set" => ExerciseMethod::TriSet,
            "Drop Set" => ExerciseMethod::DropSet,
            _ => ExerciseMethod::Other(value),
        }
    }
}

impl From<ExerciseMethod> for String {
    fn from(method: ExerciseMethod) -> Self {
        match method {
            ExerciseMethod::Other(method) => method,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MesocycleError {
    #[error("{0} must not be empty")]
    EmptyList(String),
    #[error("{0} must be a positive integer")]
    NonPositive(String),
    #[error("{path} has invalid tempo code '{tempo}'")]
    InvalidTempo { path: String, tempo: String },
}

fn tempo_pattern() -> &'static Regex {
    static TEMPO: OnceLock<Regex> = OnceLock::new();
    TEMPO.get_or_init(|| Regex::new(r"^[0-9X]{4}$").expect("tempo pattern is valid"))
}

/// Four characters, each a digit or `X` for an explosive phase.
pub fn is_valid_tempo(tempo: &str) -> bool {
    tempo_pattern().is_match(tempo)
}

impl Mesocycle {
    /// Check the structural invariants a plan must satisfy before it is stored.
    pub fn validate(&self) -> Result<(), MesocycleError> {
        if self.duration_weeks <= 0 {
            return Err(MesocycleError::NonPositive("duration_weeks".into()));
        }
        if self.phases.is_empty() {
            return Err(MesocycleError::EmptyList("phases".into()));
        }

        for (p, phase) in self.phases.iter().enumerate() {
            let phase_path = format!("phases[{p}]");
            if phase.phase_number <= 0 {
                return Err(MesocycleError::NonPositive(format!("{phase_path}.phase_number")));
            }
            if phase.weekly_split.is_empty() {
                return Err(MesocycleError::EmptyList(format!("{phase_path}.weekly_split")));
            }

            for (d, day) in phase.weekly_split.iter().enumerate() {
                let day_path = format!("{phase_path}.weekly_split[{d}]");
                if day.day_number <= 0 {
                    return Err(MesocycleError::NonPositive(format!("{day_path}.day_number")));
                }
                if day.exercise_groups.is_empty() {
                    return Err(MesocycleError::EmptyList(format!("{day_path}.exercise_groups")));
                }

                for (g, group) in day.exercise_groups.iter().enumerate() {
                    let group_path = format!("{day_path}.exercise_groups[{g}]");
                    if group.exercises.is_empty() {
                        return Err(MesocycleError::EmptyList(format!("{group_path}.exercises")));
                    }

                    for (e, exercise) in group.exercises.iter().enumerate() {
                        let exercise_path = format!("{group_path}.exercises[{e}]");
                        if exercise.sets <= 0 {
                            return Err(MesocycleError::NonPositive(format!("{exercise_path}.sets")));
                        }
                        if !is_valid_tempo(&exercise.tempo) {
                            return Err(MesocycleError::InvalidTempo {
                                path: exercise_path,
                                tempo: exercise.tempo.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// All exercises of the plan in document order.
    pub fn exercises(&self) -> impl Iterator<Item = &ExerciseDetail> {
        self.phases
            .iter()
            .flat_map(|phase| phase.weekly_split.iter())
            .flat_map(|day| day.exercise_groups.iter())
            .flat_map(|group| group.exercises.iter())
    }

    /// Response schema handed to the generation model, in the OpenAPI subset
    /// the Gemini API accepts.
    pub fn response_schema() -> Value {
        let exercise = json!({
            "type": "OBJECT",
            "properties": {
                "exercise_id": { "type": "STRING", "description": "Unique identifier for the exercise within a group (e.g., 'A1', 'B2', 'C')." },
                "name": { "type": "STRING", "description": "Full name of the exercise." },
                "sets": { "type": "INTEGER", "description": "Number of sets to perform. Positive integer." },
                "reps": { "type": "STRING", "description": "Range of repetitions or specific instruction (e.g., '10-12', '6-8', 'AMRAP >8')." },
                "tempo": { "type": "STRING", "description": "Exercise execution tempo in 4-digit format (Eccentric, Bottom Pause, Concentric, Top Pause). X indicates explosive movement (e.g., '4010', '31X0')." },
                "rest": { "type": "STRING", "description": "Rest time after performing the exercise or the entire group (e.g., '75s', '120s')." },
                "notes": { "type": "STRING", "description": "Additional notes or tips regarding exercise execution (optional)." }
            },
            "required": ["exercise_id", "name", "sets", "reps", "tempo", "rest"]
        });

        let group = json!({
            "type": "OBJECT",
            "properties": {
                "group_id": { "type": "STRING", "description": "Exercise group identifier (e.g., 'A', 'B', 'A1-A3')." },
                "method": { "type": "STRING", "description": "Special method applied to the group: Standard, Superset, Giant Set, Tri-Set, Drop Set, or another named method." },
                "exercises": { "type": "ARRAY", "items": exercise, "description": "List of exercises belonging to this group." }
            },
            "required": ["group_id", "method", "exercises"]
        });

        let day = json!({
            "type": "OBJECT",
            "properties": {
                "day_number": { "type": "INTEGER", "description": "Training day number in the week (e.g., 1, 2, 4)." },
                "focus": { "type": "STRING", "description": "Main goal or muscle groups trained on this day (e.g., 'Chest & Back')." },
                "exercise_groups": { "type": "ARRAY", "items": group, "description": "List of exercise groups planned for this day." }
            },
            "required": ["day_number", "focus", "exercise_groups"]
        });

        let phase = json!({
            "type": "OBJECT",
            "properties": {
                "phase_number": { "type": "INTEGER", "description": "Sequential phase number in the mesocycle." },
                "name": { "type": "STRING", "description": "Phase name (e.g., 'Accumulation 1')." },
                "weeks": { "type": "STRING", "description": "Range of weeks during which this phase applies (e.g., '1-4')." },
                "goal": { "type": "STRING", "description": "Main training objective of this phase." },
                "notes": { "type": "STRING", "description": "Additional notes about the entire phase (optional)." },
                "weekly_split": { "type": "ARRAY", "items": day, "description": "Distribution of training days in a week for this phase." }
            },
            "required": ["phase_number", "name", "weeks", "goal", "weekly_split"]
        });

        json!({
            "type": "OBJECT",
            "title": MESOCYCLE_SCHEMA_NAME,
            "description": MESOCYCLE_SCHEMA_DESCRIPTION,
            "properties": {
                "name": { "type": "STRING", "description": "Name of the entire training plan." },
                "goal": { "type": "STRING", "description": "Main objective of the mesocycle (e.g., 'Hypertrophy (Muscle Mass)')." },
                "duration_weeks": { "type": "INTEGER", "description": "Total duration of the mesocycle in weeks." },
                "philosophy": { "type": "STRING", "description": "Description of the philosophy or main principles of the plan." },
                "weekly_structure": { "type": "STRING", "description": "Description of the general weekly training structure." },
                "introduction": { "type": "STRING", "description": "Introduction or preliminary notes for the plan." },
                "final_notes": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "List of final, important notes regarding plan implementation." },
                "phases": { "type": "ARRAY", "items": phase, "description": "Array containing all training phases of the mesocycle." }
            },
            "required": [
                "name",
                "goal",
                "duration_weeks",
                "philosophy",
                "weekly_structure",
                "introduction",
                "final_notes",
                "phases"
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn plan() -> Mesocycle {
        serde_json::from_value(json!({
            "name": "Hypertrophy Block",
            "goal": "Hypertrophy",
            "duration_weeks": 8,
            "philosophy": "Progressive overload",
            "weekly_structure": "Upper/Lower",
            "introduction": "Warm up before every session.",
            "final_notes": ["Sleep well"],
            "phases": [{
                "phase_number": 1,
                "name": "Accumulation 1",
                "weeks": "1-4",
                "goal": "Volume",
                "weekly_split": [{
                    "day_number": 1,
                    "focus": "Chest & Back",
                    "exercise_groups": [{
                        "group_id": "A",
                        "method": "Superseria",
                        "exercises": [{
                            "exercise_id": "A1",
                            "name": "Bench Press",
                            "sets": 4,
                            "reps": "8-10",
                            "tempo": "31X0",
                            "rest": "90s"
                        }]
                    }]
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_plan_passes() {
        let plan = plan();
        assert!(plan.validate().is_ok());
        assert_eq!(plan.exercises().count(), 1);
    }

    #[test]
    fn test_method_labels() {
        let plan = plan();
        let group = &plan.phases[0].weekly_split[0].exercise_groups[0];
        assert_eq!(group.method, ExerciseMethod::Superset);

        let custom: ExerciseMethod = serde_json::from_value(json!("Rest-Pause")).unwrap();
        assert_eq!(custom, ExerciseMethod::Other("Rest-Pause".to_string()));
        assert_eq!(serde_json::to_value(&custom).unwrap(), json!("Rest-Pause"));
        assert_eq!(serde_json::to_value(ExerciseMethod::GiantSet).unwrap(), json!("Giant Set"));
    }

    #[test]
    fn test_rejects_non_positive_sets() {
        let mut plan = plan();
        plan.phases[0].weekly_split[0].exercise_groups[0].exercises[0].sets = 0;
        assert_matches!(plan.validate(), Err(MesocycleError::NonPositive(path)) if path.ends_with(".sets"));
    }

    #[test]
    fn test_rejects_empty_phases() {
        let mut plan = plan();
        plan.phases.clear();
        assert_eq!(plan.validate(), Err(MesocycleError::EmptyList("phases".to_string())));
    }

    #[test]
    fn test_tempo_codes() {
        assert!(is_valid_tempo("4010"));
        assert!(is_valid_tempo("31X0"));
        assert!(!is_valid_tempo("310"));
        assert!(!is_valid_tempo("3-1-1-0"));
        assert!(!is_valid_tempo("31x0"));
    }

    #[test]
    fn test_schema_requires_top_level_fields() {
        let schema = Mesocycle::response_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("phases")));
        assert_eq!(schema["title"], MESOCYCLE_SCHEMA_NAME);
    }
}
