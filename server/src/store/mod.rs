//! Document store abstraction.
//!
//! # Design
//! Handlers talk to a `TodoStore` trait object shared through the
//! application state. `MongoStore` is the production backend; `MemoryStore`
//! keeps the same semantics in process so the HTTP layer can be exercised
//! without a database.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::StoreError;
use crate::model::{Todo, TodoId, UpdateTodo};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Operations on the todo collection. Implementations must be safe to share
/// across concurrently running requests.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Every todo, in the store's natural order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;

    async fn insert(&self, todo: &Todo) -> Result<TodoId, StoreError>;

    /// Set title and completed on the todo with `id`. Returns how many
    /// documents actually changed, so writing identical values yields 0.
    async fn update(&self, id: TodoId, update: &UpdateTodo) -> Result<u64, StoreError>;

    /// Returns how many documents were removed (0 or 1).
    async fn delete(&self, id: TodoId) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn close(&self) {}
}

/// Build the backend selected in `config`.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    match config.backend {
        StoreBackend::Mongo => {
            let store = MongoStore::connect(config).await?;
            info!(
                database = %config.database,
                collection = %config.collection,
                "connected to mongodb"
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory todo store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
