//! # Errors
//!
//! [`QueryError`] is what the compiler returns: the store rejected the compiled query.
//! [`ApiError`] is the HTTP face of it. Internal details are logged with `tracing` and
//! never sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use std::fmt;

/// Failure while running a compiled list query.
///
/// Malformed input never produces this; the codec and normalizer drop what they cannot
/// use. Unknown columns and type mismatches surface here from the store.
#[derive(Debug)]
pub enum QueryError {
    Execution { resource: String, source: DbErr },
}

impl QueryError {
    pub fn execution(resource: impl Into<String>, source: DbErr) -> Self {
        Self::Execution {
            resource: resource.into(),
            source,
        }
    }

    #[must_use]
    pub fn resource(&self) -> &str {
        match self {
            Self::Execution { resource, .. } => resource,
        }
    }

    #[must_use]
    pub const fn db_err(&self) -> &DbErr {
        match self {
            Self::Execution { source, .. } => source,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Execution { resource, source } => {
                write!(f, "Failed to list {resource}: {source}")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Execution { source, .. } => Some(source),
        }
    }
}

/// API error with logging and a sanitized body.
#[derive(Debug)]
pub enum ApiError {
    /// 500 Internal Server Error - list query failed (details logged, not exposed)
    Query {
        /// User-facing generic message
        message: String,
        /// Internal error (logged, not sent to user)
        internal: QueryError,
    },
}

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Query { message, .. } => message.clone(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Query { internal, .. } => {
                tracing::error!(
                    resource = internal.resource(),
                    error = %internal.db_err(),
                    "List query failed"
                );
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        Self::Query {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Query { internal, .. } => Some(internal),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();
        let body = ErrorResponse {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
