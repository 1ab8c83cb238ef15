pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod models;
pub mod workout;

pub use config::{Config, ConfigError};
pub use db::{Database, DbError, MemoryDatabase, PostgrestClient};
pub use error::ApiError;
pub use handlers::{handle_friends_feed, handle_get_workout};
