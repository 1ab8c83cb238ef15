//! Friends feed assembly: friends → photos → likes, joined in memory.

use std::collections::HashSet;

use crate::db::{Database, DbError};
use crate::models::{id_key, FeedEntry};

/// The feed is the newest posts across all friends, not per friend.
pub const FEED_LIMIT: usize = 50;

pub async fn friends_feed(db: &dyn Database, user_id: &str) -> Result<Vec<FeedEntry>, DbError> {
    let friend_ids = db.accepted_friend_ids(user_id).await?;
    if friend_ids.is_empty() {
        tracing::debug!(user_id, "no accepted friendships, empty feed");
        return Ok(Vec::new());
    }

    let photos = db.recent_public_photos(&friend_ids, FEED_LIMIT).await?;
    tracing::debug!(
        user_id,
        friends = friend_ids.len(),
        photos = photos.len(),
        "fetched feed photos"
    );

    // A failed likes lookup means "liked nothing", not a failed feed.
    let liked: HashSet<String> = if photos.is_empty() {
        HashSet::new()
    } else {
        let photo_ids: Vec<String> = photos.iter().map(|p| id_key(&p.id)).collect();
        db.liked_photo_ids(user_id, &photo_ids)
            .await
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    };

    Ok(photos
        .into_iter()
        .map(|photo| {
            let user_has_liked = liked.contains(&id_key(&photo.id));
            FeedEntry::from_photo(photo, user_has_liked)
        })
        .collect())
}
