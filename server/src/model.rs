//! Domain types for the todo resource.
//!
//! # Design
//! `Todo` is the API shape. The field holding the creation time serializes as
//! `completed_at` because existing clients read it under that name. The
//! persisted document shape lives next to the Mongo store, so this module
//! stays free of driver details apart from the identifier type.

use std::{fmt, str::FromStr};

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::oid::{self, ObjectId};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Store-generated identifier of a todo, rendered as 24 hex characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TodoId(ObjectId);

impl TodoId {
    pub fn new() -> Self {
        Self(ObjectId::new())
    }

    pub fn object_id(&self) -> ObjectId {
        self.0
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ObjectId> for TodoId {
    fn from(oid: ObjectId) -> Self {
        Self(oid)
    }
}

impl FromStr for TodoId {
    type Err = oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(Self)
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

impl Serialize for TodoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_hex())
    }
}

impl<'de> Deserialize<'de> for TodoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// A single todo item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    #[serde(rename = "completed_at")]
    pub created_at: DateTime<Utc>,
}

impl Todo {
    /// A fresh, incomplete todo with a new identifier.
    ///
    /// The creation time is truncated to milliseconds, the resolution the
    /// document store keeps, so every backend hands back the same value.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TodoId::new(),
            title: title.into(),
            completed: false,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

/// Body of `POST /todo/`. A missing title decodes as empty and is rejected
/// by the handler rather than by the decoder.
#[derive(Debug, Deserialize)]
pub struct CreateTodo {
    #[serde(default)]
    pub title: String,
}

/// Body of `PUT /todo/{id}`. Both fields are always written.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

/// The `{message, data}` wrapper every successful JSON response uses.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub message: &'static str,
    pub data: T,
}

/// Response body of a successful create.
#[derive(Debug, Serialize)]
pub struct Created {
    pub message: &'static str,
    #[serde(rename = "ID")]
    pub id: TodoId,
}

/// Raw outcome of a delete, shaped like the driver result clients already parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    #[serde(rename = "DeletedCount")]
    pub deleted_count: u64,
}
