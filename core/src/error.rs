//! Request-level errors and their HTTP mapping.
//!
//! Only method and action problems are reported precisely. Everything else
//! becomes a generic 500 and the cause goes to the server log.

use http::StatusCode;
use serde::Serialize;

use crate::db::DbError;

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const INVALID_ACTION: &str = "Invalid action";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(http::Method),

    #[error("invalid action {0}")]
    InvalidAction(serde_json::Value),

    #[error("malformed request body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("request body is missing `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Database(#[from] DbError),
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidAction(_) => StatusCode::BAD_REQUEST,
            Self::Body(_) | Self::MissingField(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the caller. Never contains the underlying cause.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed(_) => METHOD_NOT_ALLOWED,
            Self::InvalidAction(_) => INVALID_ACTION,
            _ => INTERNAL_SERVER_ERROR,
        }
    }
}
