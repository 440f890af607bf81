//! Typed client core for the todo REST API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network. The caller performs the round-trip with whatever
//! HTTP stack it already has.
//!
//! # Design
//! - `TodoClient` holds only `base_url`.
//! - Every operation is a `build_*` / `parse_*` pair, so the I/O boundary is
//!   explicit and both halves test without a server.
//! - Response DTOs mirror the server's `{message, data}` envelopes but are
//!   defined here independently; the end-to-end test catches drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::TodoClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, UpdateTodo};
