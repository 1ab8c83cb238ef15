//! Framework-neutral endpoint entry points.
//!
//! Both take the request method and raw body and always produce a response;
//! the Lambda and axum adapters only convert the body type.

use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::Database;
use crate::error::{ApiError, ErrorBody, INTERNAL_SERVER_ERROR};
use crate::feed::friends_feed;
use crate::models::{FeedEntry, FormattedWorkout};
use crate::workout::fetch_workout;

pub const GET_FRIENDS_FEED: &str = "getFriendsFeed";

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

#[derive(Serialize, Debug)]
pub struct Data<T> {
    pub data: T,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FeedRequest {
    #[serde(default)]
    action: Value,
    user_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WorkoutRequest {
    user_id: Option<String>,
    workout_time: Option<String>,
}

pub async fn handle_friends_feed(
    db: &dyn Database,
    method: &Method,
    body: &[u8],
) -> Response<String> {
    render(friends_feed_request(db, method, body).await)
}

pub async fn handle_get_workout(
    db: &dyn Database,
    method: &Method,
    body: &[u8],
) -> Response<String> {
    render(get_workout_request(db, method, body).await)
}

fn require_post(method: &Method) -> Result<(), ApiError> {
    if *method == Method::POST {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed(method.clone()))
    }
}

async fn friends_feed_request(
    db: &dyn Database,
    method: &Method,
    body: &[u8],
) -> Result<Data<Vec<FeedEntry>>, ApiError> {
    require_post(method)?;
    let request: FeedRequest = serde_json::from_slice(body)?;

    // anything but the exact string, including numbers and null, is a 400
    if !matches!(&request.action, Value::String(action) if action == GET_FRIENDS_FEED) {
        return Err(ApiError::InvalidAction(request.action));
    }

    let user_id = request.user_id.ok_or(ApiError::MissingField("userId"))?;
    let data = friends_feed(db, &user_id).await?;
    Ok(Data { data })
}

async fn get_workout_request(
    db: &dyn Database,
    method: &Method,
    body: &[u8],
) -> Result<Data<FormattedWorkout>, ApiError> {
    require_post(method)?;
    let request: WorkoutRequest = serde_json::from_slice(body)?;

    let user_id = request.user_id.ok_or(ApiError::MissingField("userId"))?;
    let workout_time = request
        .workout_time
        .ok_or(ApiError::MissingField("workoutTime"))?;

    let data = fetch_workout(db, &user_id, &workout_time).await?;
    Ok(Data { data })
}

fn respond(status: StatusCode, content_type: &'static str, body: String) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<String> {
    match serde_json::to_string(value) {
        Ok(body) => respond(status, APPLICATION_JSON, body),
        Err(e) => {
            tracing::error!("failed to serialize response: {}", e);
            internal_error()
        }
    }
}

fn internal_error() -> Response<String> {
    respond(
        StatusCode::INTERNAL_SERVER_ERROR,
        APPLICATION_JSON,
        format!(r#"{{"error":"{}"}}"#, INTERNAL_SERVER_ERROR),
    )
}

fn render<T: Serialize>(result: Result<Data<T>, ApiError>) -> Response<String> {
    let err = match result {
        Ok(data) => return json(StatusCode::OK, &data),
        Err(err) => err,
    };

    let status = err.status();
    match &err {
        ApiError::MethodNotAllowed(_) => {
            respond(status, TEXT_PLAIN, err.public_message().to_string())
        }
        ApiError::InvalidAction(_) => {
            tracing::warn!("{}", err);
            json(status, &ErrorBody { error: err.public_message() })
        }
        _ => {
            tracing::error!("request failed: {}", err);
            json(status, &ErrorBody { error: err.public_message() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Friendship, MemoryDatabase, Photo, Query};
    use crate::models::{ExerciseSetRow, PhotoOwner, WorkoutExerciseRow, WorkoutRow};
    use serde_json::{json, Value};

    fn body_json(response: &Response<String>) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    fn example_feed_db() -> MemoryDatabase {
        MemoryDatabase::new()
            .with_friendship(Friendship::accepted("u1", "u2"))
            .with_user(PhotoOwner {
                id: "u2".into(),
                username: json!("lifter"),
                first_name: json!("Sam"),
                last_name: json!("Lee"),
                profile_pic: json!("pic"),
            })
            .with_photo(Photo::new("p1", "u2", "2024-01-01T00:00:00Z", "public"))
    }

    fn example_workout() -> WorkoutRow {
        WorkoutRow {
            name: json!("Legs"),
            start_time: "2024-01-01T00:00:00Z".into(),
            duration: json!(50),
            pump: json!(3),
            soreness: json!(2),
            workload: json!(5000.0),
            suggestion: Value::Null,
            program_name: json!("5x5"),
            workout_exercises: vec![
                WorkoutExerciseRow {
                    order_index: Some(1.0),
                    exercise_name: json!("Leg Curl"),
                    exercise_subtype: json!("Machine"),
                    muscles: json!(["Hamstrings", "Glutes"]),
                    instructions: json!("slow"),
                    equipment: json!("Machine"),
                    exercise_sets: vec![],
                },
                WorkoutExerciseRow {
                    order_index: Some(0.0),
                    exercise_name: json!("Squat"),
                    exercise_subtype: json!("Barbell"),
                    muscles: json!("Quads"),
                    instructions: Value::Null,
                    equipment: json!("Barbell"),
                    exercise_sets: vec![
                        ExerciseSetRow {
                            set_number: Some(2.0),
                            weight: json!(100.0),
                            reps: json!(5),
                            rpe: json!(8.0),
                            rir: json!(2),
                            completed: json!(false),
                            set_type: json!("working"),
                            is_drop_set: json!(true),
                        },
                        ExerciseSetRow {
                            set_number: Some(1.0),
                            weight: json!(60.0),
                            reps: json!(8),
                            rpe: Value::Null,
                            rir: Value::Null,
                            completed: json!(true),
                            set_type: json!("warmup"),
                            is_drop_set: json!(false),
                        },
                    ],
                },
            ],
        }
    }

    #[tokio::test]
    async fn feed_example_request() {
        let db = example_feed_db();
        let response = handle_friends_feed(
            &db,
            &Method::POST,
            br#"{"action":"getFriendsFeed","userId":"u1"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(&response),
            json!({
                "data": [{
                    "id": "p1",
                    "base64": "data:image/jpeg;base64,p1",
                    "timestamp": "2024-01-01T00:00:00Z",
                    "weight": null,
                    "caption": null,
                    "pump": null,
                    "likes": 0,
                    "visibility": "public",
                    "userHasLiked": false,
                    "user": {
                        "id": "u2",
                        "username": "lifter",
                        "first_name": "Sam",
                        "last_name": "Lee",
                        "profile_pic": "pic"
                    },
                    "comments": []
                }]
            })
        );
    }

    #[tokio::test]
    async fn feed_without_friends_is_empty_data() {
        let db = MemoryDatabase::new();
        let response = handle_friends_feed(
            &db,
            &Method::POST,
            br#"{"action":"getFriendsFeed","userId":"u1"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response), json!({ "data": [] }));
        assert_eq!(db.calls(Query::Photos), 0);
    }

    #[tokio::test]
    async fn feed_rejects_unknown_action() {
        let db = example_feed_db();
        let response =
            handle_friends_feed(&db, &Method::POST, br#"{"action":"likePhoto","userId":"u1"}"#)
                .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response), json!({ "error": "Invalid action" }));
        assert_eq!(db.total_calls(), 0);
    }

    #[tokio::test]
    async fn feed_rejects_missing_action() {
        let db = example_feed_db();
        let response = handle_friends_feed(&db, &Method::POST, br#"{"userId":"u1"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn feed_rejects_non_string_actions() {
        let db = example_feed_db();
        let bodies: [&[u8]; 4] = [
            br#"{"action":123,"userId":"u1"}"#,
            br#"{"action":null,"userId":"u1"}"#,
            br#"{"action":["getFriendsFeed"],"userId":"u1"}"#,
            br#"{"action":{"name":"getFriendsFeed"},"userId":"u1"}"#,
        ];

        for body in bodies {
            let response = handle_friends_feed(&db, &Method::POST, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(body_json(&response), json!({ "error": "Invalid action" }));
        }
        assert_eq!(db.total_calls(), 0);
    }

    #[tokio::test]
    async fn non_post_is_405_without_queries() {
        let db = example_feed_db().with_workout("u1", example_workout());

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::OPTIONS] {
            let feed = handle_friends_feed(&db, &method, b"").await;
            assert_eq!(feed.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(feed.body(), "Method Not Allowed");

            let workout = handle_get_workout(&db, &method, b"").await;
            assert_eq!(workout.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(workout.body(), "Method Not Allowed");
        }
        assert_eq!(db.total_calls(), 0);
    }

    #[tokio::test]
    async fn feed_database_failure_is_generic_500() {
        let db = example_feed_db().failing(Query::Friendships);
        let response = handle_friends_feed(
            &db,
            &Method::POST,
            br#"{"action":"getFriendsFeed","userId":"u1"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response), json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn malformed_body_is_500() {
        let db = example_feed_db();
        let response = handle_friends_feed(&db, &Method::POST, b"not json").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = handle_get_workout(&db, &Method::POST, br#"{"userId":"u1"}"#).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.total_calls(), 0);
    }

    #[tokio::test]
    async fn workout_is_reshaped() {
        let db = MemoryDatabase::new().with_workout("u1", example_workout());
        let response = handle_get_workout(
            &db,
            &Method::POST,
            br#"{"userId":"u1","workoutTime":"2024-01-01T00:00:00Z"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(&response),
            json!({
                "data": {
                    "name": "Legs",
                    "startTime": "2024-01-01T00:00:00Z",
                    "duration": 50,
                    "pump": 3,
                    "soreness": 2,
                    "workload": 5000.0,
                    "suggestion": null,
                    "programName": "5x5",
                    "exercises": [
                        {
                            "name": "Squat",
                            "subtype": "Barbell",
                            "muscles": "Quads",
                            "instructions": null,
                            "equipment": "Barbell",
                            "sets": [
                                {
                                    "weight": 60.0, "reps": 8, "rpe": null, "rir": null,
                                    "completed": true, "type": "warmup", "isDropSet": false
                                },
                                {
                                    "weight": 100.0, "reps": 5, "rpe": 8.0, "rir": 2,
                                    "completed": false, "type": "working", "isDropSet": true
                                }
                            ]
                        },
                        {
                            "name": "Leg Curl",
                            "subtype": "Machine",
                            "muscles": ["Hamstrings", "Glutes"],
                            "instructions": "slow",
                            "equipment": "Machine",
                            "sets": []
                        }
                    ]
                }
            })
        );
    }

    #[tokio::test]
    async fn workout_not_found_is_generic_500() {
        let db = MemoryDatabase::new();
        let response = handle_get_workout(
            &db,
            &Method::POST,
            br#"{"userId":"u1","workoutTime":"2024-01-01T00:00:00Z"}"#,
        )
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response), json!({ "error": "Internal server error" }));
    }
}
