use std::{path::PathBuf, sync::Arc};

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::store::TodoStore;

/// Shared context handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
    pub home_page: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn TodoStore>, home_page: impl Into<PathBuf>) -> Self {
        Self {
            store,
            home_page: Arc::new(home_page.into()),
        }
    }
}

/// The full application router. `/todo` and `/todo/` are both served so
/// clients written against either form keep working.
pub fn app(state: AppState) -> Router {
    let collection = || get(handlers::list_todos).post(handlers::create_todo);

    Router::new()
        .route("/", get(handlers::home))
        .route("/todo", collection())
        .route("/todo/", collection())
        .route(
            "/todo/{id}",
            put(handlers::update_todo).delete(handlers::delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
