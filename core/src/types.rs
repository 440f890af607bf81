//! DTOs for the todo API, including the response envelopes.

use serde::{Deserialize, Serialize};

/// A todo as listed by the server. `created_at` travels as `completed_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "completed_at")]
    pub created_at: String,
}

/// Request payload for creating a todo.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTodo {
    pub title: String,
}

/// Request payload for updating a todo. Both fields are always sent.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateTodo {
    pub title: String,
    pub completed: bool,
}

/// Successful `{message, data}` body; only `data` is read.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Created {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteResult {
    #[serde(rename = "DeletedCount")]
    pub deleted_count: u64,
}

/// Error body: `{message, error?}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}
