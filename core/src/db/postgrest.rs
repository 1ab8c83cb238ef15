use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::{Database, DbError};
use crate::config::Config;
use crate::models::{id_key, PhotoRow, WorkoutRow};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

const PHOTO_COLUMNS: &str = "id,photo_url,timestamp,weight,caption,pump,likes,visibility,\
user:users(id,username,first_name,last_name,profile_pic)";

const WORKOUT_COLUMNS: &str = "name,start_time,duration,pump,soreness,workload,suggestion,program_name,\
workout_exercises(order_index,exercise_name,exercise_subtype,muscles,instructions,equipment,\
exercise_sets(set_number,weight,reps,rpe,rir,completed,set_type,is_drop_set))";

type Params = Vec<(&'static str, String)>;

/// Supabase REST (PostgREST) client authenticated with the service key.
#[derive(Clone)]
pub struct PostgrestClient {
    client: reqwest::Client,
    rest_url: Arc<String>,
    service_key: Arc<String>,
}

impl PostgrestClient {
    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            rest_url: Arc::new(format!("{}/rest/v1", config.supabase_url)),
            service_key: Arc::new(config.service_key.clone()),
        }
    }

    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        params: Params,
        single: bool,
    ) -> Result<T, DbError> {
        tracing::debug!(table, ?params, single, "postgrest select");

        let mut request = self
            .client
            .get(format!("{}/{}", self.rest_url, table))
            .query(&params)
            .header("apikey", self.service_key.as_str())
            .bearer_auth(self.service_key.as_str());
        if single {
            request = request.header(ACCEPT, SINGLE_OBJECT);
        }

        let res = request.send().await?;
        let status = res.status();
        let body = res.text().await?;

        if single && status == StatusCode::NOT_ACCEPTABLE {
            return Err(DbError::NotSingleRow {
                resource: table,
                detail: body,
            });
        }
        if !status.is_success() {
            return Err(DbError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Deserialize)]
struct FriendIdRow {
    friend_id: Value,
}

#[derive(Deserialize)]
struct LikedPhotoRow {
    photo_id: Value,
}

#[async_trait]
impl Database for PostgrestClient {
    async fn accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>, DbError> {
        let rows: Vec<FriendIdRow> = self
            .select("friendships", friendships_params(user_id), false)
            .await?;
        Ok(rows.iter().map(|r| id_key(&r.friend_id)).collect())
    }

    async fn recent_public_photos(
        &self,
        owner_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PhotoRow>, DbError> {
        self.select("photos", photos_params(owner_ids, limit), false)
            .await
    }

    async fn liked_photo_ids(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> Result<Vec<String>, DbError> {
        let rows: Vec<LikedPhotoRow> = self
            .select("likes", likes_params(user_id, photo_ids), false)
            .await?;
        Ok(rows.iter().map(|r| id_key(&r.photo_id)).collect())
    }

    async fn workout_with_exercises(
        &self,
        user_id: &str,
        start_time: &str,
    ) -> Result<WorkoutRow, DbError> {
        self.select("workouts", workout_params(user_id, start_time), true)
            .await
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

/// `in.("a","b")` with values quoted so commas and parentheses survive.
fn in_list(values: &[String]) -> String {
    let quoted: Vec<String> = values
        .iter()
        .map(|v| format!("\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

fn friendships_params(user_id: &str) -> Params {
    vec![
        ("select", "friend_id".to_string()),
        ("user_id", eq(user_id)),
        ("status", eq("accepted")),
    ]
}

fn photos_params(owner_ids: &[String], limit: usize) -> Params {
    vec![
        ("select", PHOTO_COLUMNS.to_string()),
        ("user_id", in_list(owner_ids)),
        ("visibility", eq("public")),
        ("order", "timestamp.desc".to_string()),
        ("limit", limit.to_string()),
    ]
}

fn likes_params(user_id: &str, photo_ids: &[String]) -> Params {
    vec![
        ("select", "photo_id".to_string()),
        ("user_id", eq(user_id)),
        ("photo_id", in_list(photo_ids)),
    ]
}

fn workout_params(user_id: &str, start_time: &str) -> Params {
    vec![
        ("select", WORKOUT_COLUMNS.to_string()),
        ("user_id", eq(user_id)),
        ("start_time", eq(start_time)),
    ]
}
