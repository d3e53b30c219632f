// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

/// Failures of the persistence layer. All of them are fatal to the request
/// that hit them and safe to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("database connection unavailable: {0}")]
    Pool(String),

    #[error("database migration failed: {0}")]
    Migration(String),

    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum BoostError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no active boosting session for user {0}")]
    NoActiveSession(i32),

    #[error("video {video_id} is not part of the session queue of user {user_id}")]
    UnknownItem { user_id: i32, video_id: String },

    #[error("video {video_id} is queued but not playing for user {user_id}")]
    ItemNotPlaying { user_id: i32, video_id: String },

    #[error("session of user {user_id} boosts channel {expected}, not {actual}")]
    ChannelMismatch {
        user_id: i32,
        expected: String,
        actual: String,
    },

    #[error("could not resolve playable videos: {0}")]
    Resolution(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("storage failure: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for BoostError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => BoostError::NotFound(what),
            other => BoostError::Storage(other),
        }
    }
}

impl BoostError {
    /// Whether the caller may retry the same request unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, BoostError::Storage(_) | BoostError::Resolution(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            BoostError::InvalidInput(_) | BoostError::ChannelMismatch { .. } => {
                StatusCode::BAD_REQUEST
            }
            BoostError::NoActiveSession(_)
            | BoostError::UnknownItem { .. }
            | BoostError::NotFound(_) => StatusCode::NOT_FOUND,
            BoostError::ItemNotPlaying { .. } => StatusCode::CONFLICT,
            BoostError::Resolution(_) => StatusCode::BAD_GATEWAY,
            BoostError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for BoostError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected: {}", self);
        }

        let body = if self.is_retryable() {
            json!({ "error": self.to_string(), "retryable": true })
        } else {
            json!({ "error": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_is_not_a_storage_failure() {
        let err: BoostError = StoreError::NotFound("calendar event 3".into()).into();
        assert!(matches!(err, BoostError::NotFound(_)));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_retryable());
    }

    #[test]
    fn storage_failures_are_retryable_503s() {
        let err: BoostError = StoreError::Pool("timed out".into()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
    }

    #[test]
    fn session_errors_map_to_client_statuses() {
        assert_eq!(
            BoostError::NoActiveSession(1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BoostError::ItemNotPlaying {
                user_id: 1,
                video_id: "v".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BoostError::Resolution("quota".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }
}
