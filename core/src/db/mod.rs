//! Read access to the hosted database.
//!
//! Handlers only talk to the [`Database`] trait. [`PostgrestClient`] is the
//! production implementation; [`MemoryDatabase`] is an in-process double.

mod memory;
mod postgrest;

use async_trait::async_trait;

use crate::models::{PhotoRow, WorkoutRow};

pub use memory::{Friendship, Like, MemoryDatabase, Photo, Query};
pub use postgrest::PostgrestClient;

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("database request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("database returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode database response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected exactly one {resource} row: {detail}")]
    NotSingleRow {
        resource: &'static str,
        detail: String,
    },
}

#[async_trait]
pub trait Database: Send + Sync {
    /// `friend_id` of every accepted friendship where `user_id` is the requester.
    async fn accepted_friend_ids(&self, user_id: &str) -> Result<Vec<String>, DbError>;

    /// Newest public photos owned by any of `owner_ids`, with the owner profile
    /// joined, ordered by `timestamp` descending and capped at `limit`.
    async fn recent_public_photos(
        &self,
        owner_ids: &[String],
        limit: usize,
    ) -> Result<Vec<PhotoRow>, DbError>;

    /// The subset of `photo_ids` that `user_id` has liked.
    async fn liked_photo_ids(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> Result<Vec<String>, DbError>;

    /// The single workout at `(user_id, start_time)` with exercises and sets.
    /// Zero or several matches are both errors.
    async fn workout_with_exercises(
        &self,
        user_id: &str,
        start_time: &str,
    ) -> Result<WorkoutRow, DbError>;
}
