//! Todo handlers: decode the request, call the store, wrap the result.
//!
//! Bodies are taken as raw bytes and decoded here instead of through axum's
//! `Json` extractor, so a body sent without a JSON content type is still
//! accepted and every decode failure gets the same 400 envelope.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::model::{CreateTodo, Created, DeleteResult, Envelope, Todo, TodoId, UpdateTodo};
use crate::routes::AppState;

fn decode<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::invalid_with("Could not decode data", e))
}

fn parse_id(raw: &str) -> Result<TodoId, ApiError> {
    raw.parse().map_err(|e| ApiError::invalid_with("Invalid id", e))
}

/// `GET /` serves the configured home page file.
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let content = tokio::fs::read(state.home_page.as_path()).await.map_err(|e| {
        warn!(path = %state.home_page.display(), error = %e, "home page unavailable");
        ApiError::NotFound {
            message: "Home page not found",
        }
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"readme.md\""),
        ],
        content,
    ))
}

pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Todo>>>, ApiError> {
    let todos = state
        .store
        .list()
        .await
        .map_err(|e| ApiError::store("Could not fetch the todo collection", e))?;
    Ok(Json(Envelope {
        message: "All Todos retrieved",
        data: todos,
    }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let input: CreateTodo = decode(&body)?;
    if input.title.is_empty() {
        return Err(ApiError::invalid("Please add a title"));
    }

    let todo = Todo::new(input.title);
    let id = state
        .store
        .insert(&todo)
        .await
        .map_err(|e| ApiError::store("Failed to add data into the database", e))?;

    info!(%id, "todo created");
    Ok((
        StatusCode::CREATED,
        Json(Created {
            message: "Todo created successfully",
            id,
        }),
    ))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Envelope<u64>>, ApiError> {
    let id = parse_id(&id)?;
    let input: UpdateTodo = decode(&body)?;
    if input.title.is_empty() {
        return Err(ApiError::invalid("Title cannot be empty"));
    }

    let modified = state
        .store
        .update(id, &input)
        .await
        .map_err(|e| ApiError::store("Failed to update data in db collection", e))?;

    info!(%id, modified, "todo updated");
    Ok(Json(Envelope {
        message: "Successfully updated item",
        data: modified,
    }))
}

/// Deleting an id that matches nothing still succeeds; the count tells the
/// caller whether anything was removed.
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<DeleteResult>>, ApiError> {
    let id = parse_id(&id)?;
    let deleted_count = state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::store("An error occurred while deleting the todo item", e))?;

    info!(%id, deleted_count, "todo deleted");
    Ok(Json(Envelope {
        message: "Item deleted successfully",
        data: DeleteResult { deleted_count },
    }))
}
