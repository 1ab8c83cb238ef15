//! Row and response shapes.
//!
//! Columns that are only passed through are kept as raw JSON so whatever type
//! the schema uses reaches the caller unchanged. Only the fields the handlers
//! compare or sort on are typed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Text form of an id column, so uuid and bigint keys compare the same way.
pub fn id_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Sort position; a null index sorts as 0.
fn position(index: Option<f64>) -> f64 {
    index.unwrap_or(0.0)
}

/// Public profile fields of a photo's owner, embedded through `photos.user_id`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct PhotoOwner {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub username: Value,
    #[serde(default)]
    pub first_name: Value,
    #[serde(default)]
    pub last_name: Value,
    #[serde(default)]
    pub profile_pic: Value,
}

/// A photo as returned by the feed query, owner already joined.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PhotoRow {
    pub id: Value,
    #[serde(default)]
    pub photo_url: Value,
    pub timestamp: String,
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub caption: Value,
    #[serde(default)]
    pub pump: Value,
    #[serde(default)]
    pub likes: Value,
    pub visibility: String,
    pub user: Option<PhotoOwner>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: Value,
    pub base64: Value,
    pub timestamp: String,
    pub weight: Value,
    pub caption: Value,
    pub pump: Value,
    pub likes: Value,
    pub visibility: String,
    pub user_has_liked: bool,
    pub user: Option<PhotoOwner>,
    pub comments: Vec<Value>,
}

impl FeedEntry {
    pub fn from_photo(photo: PhotoRow, user_has_liked: bool) -> Self {
        Self {
            id: photo.id,
            base64: photo.photo_url,
            timestamp: photo.timestamp,
            weight: photo.weight,
            caption: photo.caption,
            pump: photo.pump,
            likes: photo.likes,
            visibility: photo.visibility,
            user_has_liked,
            user: photo.user,
            comments: Vec::new(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ExerciseSetRow {
    pub set_number: Option<f64>,
    #[serde(default)]
    pub weight: Value,
    #[serde(default)]
    pub reps: Value,
    #[serde(default)]
    pub rpe: Value,
    #[serde(default)]
    pub rir: Value,
    #[serde(default)]
    pub completed: Value,
    #[serde(default)]
    pub set_type: Value,
    #[serde(default)]
    pub is_drop_set: Value,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutExerciseRow {
    pub order_index: Option<f64>,
    #[serde(default)]
    pub exercise_name: Value,
    #[serde(default)]
    pub exercise_subtype: Value,
    #[serde(default)]
    pub muscles: Value,
    #[serde(default)]
    pub instructions: Value,
    #[serde(default)]
    pub equipment: Value,
    #[serde(default)]
    pub exercise_sets: Vec<ExerciseSetRow>,
}

/// One workout with its exercises and their sets embedded.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutRow {
    #[serde(default)]
    pub name: Value,
    pub start_time: String,
    #[serde(default)]
    pub duration: Value,
    #[serde(default)]
    pub pump: Value,
    #[serde(default)]
    pub soreness: Value,
    #[serde(default)]
    pub workload: Value,
    #[serde(default)]
    pub suggestion: Value,
    #[serde(default)]
    pub program_name: Value,
    #[serde(default)]
    pub workout_exercises: Vec<WorkoutExerciseRow>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormattedSet {
    pub weight: Value,
    pub reps: Value,
    pub rpe: Value,
    pub rir: Value,
    pub completed: Value,
    #[serde(rename = "type")]
    pub kind: Value,
    pub is_drop_set: Value,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FormattedExercise {
    pub name: Value,
    pub subtype: Value,
    pub muscles: Value,
    pub instructions: Value,
    pub equipment: Value,
    pub sets: Vec<FormattedSet>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormattedWorkout {
    pub name: Value,
    pub start_time: String,
    pub duration: Value,
    pub pump: Value,
    pub soreness: Value,
    pub workload: Value,
    pub suggestion: Value,
    pub program_name: Value,
    pub exercises: Vec<FormattedExercise>,
}

impl From<ExerciseSetRow> for FormattedSet {
    fn from(set: ExerciseSetRow) -> Self {
        Self {
            weight: set.weight,
            reps: set.reps,
            rpe: set.rpe,
            rir: set.rir,
            completed: set.completed,
            kind: set.set_type,
            is_drop_set: set.is_drop_set,
        }
    }
}

impl From<WorkoutExerciseRow> for FormattedExercise {
    fn from(exercise: WorkoutExerciseRow) -> Self {
        let mut sets = exercise.exercise_sets;
        sets.sort_by(|a, b| position(a.set_number).total_cmp(&position(b.set_number)));

        Self {
            name: exercise.exercise_name,
            subtype: exercise.exercise_subtype,
            muscles: exercise.muscles,
            instructions: exercise.instructions,
            equipment: exercise.equipment,
            sets: sets.into_iter().map(FormattedSet::from).collect(),
        }
    }
}

impl From<WorkoutRow> for FormattedWorkout {
    fn from(workout: WorkoutRow) -> Self {
        let mut exercises = workout.workout_exercises;
        exercises.sort_by(|a, b| position(a.order_index).total_cmp(&position(b.order_index)));

        Self {
            name: workout.name,
            start_time: workout.start_time,
            duration: workout.duration,
            pump: workout.pump,
            soreness: workout.soreness,
            workload: workout.workload,
            suggestion: workout.suggestion,
            program_name: workout.program_name,
            exercises: exercises.into_iter().map(FormattedExercise::from).collect(),
        }
    }
}
