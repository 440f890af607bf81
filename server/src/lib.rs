//! Todo list REST API backed by a document store.
//!
//! # Overview
//! `GET /` serves the README; `/todo/` exposes list, create, update and
//! delete over a single collection. Handlers share one [`AppState`] holding
//! the store, built once at startup.
//!
//! # Design
//! - [`store::TodoStore`] hides the backend. MongoDB in production, an
//!   in-memory store for tests and local runs.
//! - Handler failures are [`error::ApiError`] values rendered as
//!   `{message, error}` envelopes.
//! - [`lifecycle::run`] owns startup and bounded graceful shutdown.

pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod model;
pub mod routes;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, StoreError};
pub use model::{Todo, TodoId};
pub use routes::{app, AppState};
pub use store::{MemoryStore, MongoStore, TodoStore};
