//! Error types for the todo server.
//!
//! # Design
//! `StoreError` is what a store backend reports. `ApiError` is what a handler
//! returns; it carries the client-facing message and renders the
//! `{message, error}` envelope. Store text is passed through to the `error`
//! field so existing clients keep seeing the driver's explanation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Failures reported by a [`TodoStore`](crate::store::TodoStore) backend.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Operation(String),

    #[error("malformed document: {0}")]
    Decode(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        match *e.kind {
            mongodb::error::ErrorKind::BsonDeserialization(_) => Self::Decode(e.to_string()),
            _ => Self::Operation(e.to_string()),
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Errors a handler turns into an HTTP response.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    InvalidInput {
        message: &'static str,
        detail: Option<String>,
    },

    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{message}")]
    NotFound { message: &'static str },
}

impl ApiError {
    pub fn invalid(message: &'static str) -> Self {
        Self::InvalidInput {
            message,
            detail: None,
        }
    }

    pub fn invalid_with(message: &'static str, detail: impl ToString) -> Self {
        Self::InvalidInput {
            message,
            detail: Some(detail.to_string()),
        }
    }

    pub fn store(message: &'static str, source: StoreError) -> Self {
        Self::Store { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::InvalidInput { message, detail } => {
                warn!(detail = detail.as_deref().unwrap_or(""), "{message}");
                ErrorBody {
                    message,
                    error: detail,
                }
            }
            Self::Store { message, source } => {
                error!(error = %source, "{message}");
                ErrorBody {
                    message,
                    error: Some(source.to_string()),
                }
            }
            Self::NotFound { message } => ErrorBody {
                message,
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
