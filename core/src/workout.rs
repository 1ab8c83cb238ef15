use crate::db::{Database, DbError};
use crate::models::FormattedWorkout;

/// Fetches the workout at `(user_id, workout_time)` and reshapes it:
/// exercises by `order_index`, sets by `set_number`, fields renamed.
pub async fn fetch_workout(
    db: &dyn Database,
    user_id: &str,
    workout_time: &str,
) -> Result<FormattedWorkout, DbError> {
    let row = db.workout_with_exercises(user_id, workout_time).await?;
    tracing::debug!(
        user_id,
        workout_time,
        exercises = row.workout_exercises.len(),
        "fetched workout"
    );
    Ok(FormattedWorkout::from(row))
}
