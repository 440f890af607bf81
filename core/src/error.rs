//! Error types for the todo API client.
//!
//! The server answers failures with a `{message, error}` envelope. When that
//! body parses, its fields are carried on the error; otherwise the raw body
//! becomes the message.

use std::fmt;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug)]
pub enum ApiError {
    /// 400: the server rejected the input (bad id, bad body, empty title).
    InvalidInput {
        message: String,
        detail: Option<String>,
    },

    /// 404: unknown route or missing home page.
    NotFound,

    /// Any other unexpected status, including 500 store failures.
    HttpError {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    SerializationError(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput { message, detail } => {
                write!(f, "invalid input: {message}")?;
                if let Some(detail) = detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            ApiError::NotFound => write!(f, "resource not found"),
            ApiError::HttpError {
                status,
                message,
                detail,
            } => {
                write!(f, "HTTP {status}: {message}")?;
                if let Some(detail) = detail {
                    write!(f, " ({detail})")?;
                }
                Ok(())
            }
            ApiError::DeserializationError(msg) => {
                write!(f, "deserialization failed: {msg}")
            }
            ApiError::SerializationError(msg) => {
                write!(f, "serialization failed: {msg}")
            }
        }
    }
}

impl std::error::Error for ApiError {}
