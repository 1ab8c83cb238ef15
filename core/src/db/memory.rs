use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::{json, Value};

use super::{Database, DbError};
use crate::models::{id_key, PhotoOwner, PhotoRow, WorkoutRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    Friendships,
    Photos,
    Likes,
    Workout,
}

#[derive(Debug, Clone)]
pub struct Friendship {
    pub user_id: String,
    pub friend_id: String,
    pub status: String,
}

impl Friendship {
    pub fn accepted(user_id: &str, friend_id: &str) -> Self {
        Self::with_status(user_id, friend_id, "accepted")
    }

    pub fn with_status(user_id: &str, friend_id: &str, status: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            friend_id: friend_id.to_string(),
            status: status.to_string(),
        }
    }
}

/// A `photos` table row. `user_id` is the join key onto the owner profile.
#[derive(Debug, Clone)]
pub struct Photo {
    pub id: String,
    pub user_id: String,
    pub photo_url: Value,
    pub timestamp: String,
    pub weight: Value,
    pub caption: Value,
    pub pump: Value,
    pub likes: Value,
    pub visibility: String,
}

impl Photo {
    pub fn new(id: &str, user_id: &str, timestamp: &str, visibility: &str) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            photo_url: json!(format!("data:image/jpeg;base64,{id}")),
            timestamp: timestamp.to_string(),
            weight: Value::Null,
            caption: Value::Null,
            pump: Value::Null,
            likes: json!(0),
            visibility: visibility.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Like {
    pub user_id: String,
    pub photo_id: String,
}

impl Like {
    pub fn new(user_id: &str, photo_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            photo_id: photo_id.to_string(),
        }
    }
}

/// In-memory stand-in for the hosted database.
///
/// Applies the same filters, joins, ordering and limits as the REST queries,
/// counts how often each query ran and can be told to fail specific queries.
#[derive(Default)]
pub struct MemoryDatabase {
    friendships: Vec<Friendship>,
    photos: Vec<Photo>,
    users: Vec<PhotoOwner>,
    likes: Vec<Like>,
    workouts: Vec<(String, WorkoutRow)>,
    failing: HashSet<Query>,
    calls: Mutex<HashMap<Query, usize>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_friendship(mut self, friendship: Friendship) -> Self {
        self.friendships.push(friendship);
        self
    }

    pub fn with_photo(mut self, photo: Photo) -> Self {
        self.photos.push(photo);
        self
    }

    pub fn with_user(mut self, user: PhotoOwner) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_like(mut self, like: Like) -> Self {
        self.likes.push(like);
        self
    }

    pub fn with_workout(mut self, user_id: &str, workout: WorkoutRow) -> Self {
        self.workouts.push((user_id.to_string(), workout));
        self
    }

    pub fn failing(mut self, query: Query) -> Self {
        self.failing.insert(query);
        self
    }

    /// Number of times `query` has been issued so far.
    pub fn calls(&self, query: Query) -> usize {
        self.counters().get(&query).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.counters().values().sum()
    }

    // counters stay usable after a panicking test thread poisoned the lock
    fn counters(&self) -> MutexGuard<'_, HashMap<Query, usize>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, query: Query) -> Result<(), DbError> {
        *self.counters().entry(query).or_insert(0) += 1;

        if self.failing.contains(&query) {
            return Err(DbError::Status {
                status: 503,
                body: format!("{query:?} unavailable"),
            });
        }
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).ok()
}

/// Orders by instant when both sides are RFC 3339, lexically otherwise.
fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn same_instant(a: &str, b: &str) -> bool {
    compare_timestamps(a, b) == Ordering::Equal
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>, DbError> {
        self.record(Query::Friendships)?;

        Ok(self
            .friendships
            .iter()
            .filter(|f| f.user_id == user_id && f.status == "accepted")
            .map(|f| f.friend_id.clone())
            .collect())
    }

    async fn recent_public_photos(
        &self,
        owner_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PhotoRow>, DbError> {
        self.record(Query::Photos)?;

        let mut photos: Vec<&Photo> = self
            .photos
            .iter()
            .filter(|p| owner_ids.contains(&p.user_id) && p.visibility == "public")
            .collect();
        photos.sort_by(|a, b| compare_timestamps(&b.timestamp, &a.timestamp));
        photos.truncate(limit);

        Ok(photos
            .into_iter()
            .map(|p| PhotoRow {
                id: json!(p.id),
                photo_url: p.photo_url.clone(),
                timestamp: p.timestamp.clone(),
                weight: p.weight.clone(),
                caption: p.caption.clone(),
                pump: p.pump.clone(),
                likes: p.likes.clone(),
                visibility: p.visibility.clone(),
                user: self
                    .users
                    .iter()
                    .find(|u| id_key(&u.id) == p.user_id)
                    .cloned(),
            })
            .collect())
    }

    async fn liked_photo_ids(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> Result<Vec<String>, DbError> {
        self.record(Query::Likes)?;

        Ok(self
            .likes
            .iter()
            .filter(|l| l.user_id == user_id && photo_ids.contains(&l.photo_id))
            .map(|l| l.photo_id.clone())
            .collect())
    }

    async fn workout_with_exercises(
        &self,
        user_id: &str,
        start_time: &str,
    ) -> Result<WorkoutRow, DbError> {
        self.record(Query::Workout)?;

        let matches: Vec<&WorkoutRow> = self
            .workouts
            .iter()
            .filter(|(owner, w)| owner == user_id && same_instant(&w.start_time, start_time))
            .map(|(_, w)| w)
            .collect();

        match matches.as_slice() {
            [workout] => Ok((*workout).clone()),
            other => Err(DbError::NotSingleRow {
                resource: "workouts",
                detail: format!("the result contains {} rows", other.len()),
            }),
        }
    }
}
