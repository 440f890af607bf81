//! Stateless request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Each operation is a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming the
//! `HttpResponse`; the caller does the round-trip in between.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Created, DeleteResult, Envelope, ErrorEnvelope, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    pub fn build_home(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/")
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/todo/")
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/todo/", input)
    }

    pub fn build_update_todo(&self, id: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/todo/{id}"), input)
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/todo/{id}"))
    }

    /// Returns the home page body as text.
    pub fn parse_home(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        Ok(response.body)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        decode::<Envelope<Vec<Todo>>>(&response.body).map(|env| env.data)
    }

    /// Returns the new todo's id.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 201)?;
        decode::<Created>(&response.body).map(|created| created.id)
    }

    /// Returns how many todos changed.
    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<u64, ApiError> {
        check_status(&response, 200)?;
        decode::<Envelope<u64>>(&response.body).map(|env| env.data)
    }

    /// Returns how many todos were removed; 0 means the id matched nothing.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<u64, ApiError> {
        check_status(&response, 200)?;
        decode::<Envelope<DeleteResult>>(&response.body).map(|env| env.data.deleted_count)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    let (message, detail) = match serde_json::from_str::<ErrorEnvelope>(&response.body) {
        Ok(env) => (env.message, env.error),
        Err(_) => (response.body.clone(), None),
    };
    if response.status == 400 {
        return Err(ApiError::InvalidInput { message, detail });
    }
    Err(ApiError::HttpError {
        status: response.status,
        message,
        detail,
    })
}
