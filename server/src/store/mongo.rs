use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    options::ClientOptions,
    Client, Collection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TodoStore;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::model::{Todo, TodoId, UpdateTodo};

/// Persisted shape of a todo. The identifier lives in `id` rather than
/// `_id`; existing collections were written that way and every filter
/// matches on it.
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    id: ObjectId,
    title: String,
    #[serde(default)]
    completed: bool,
    completed_at: BsonDateTime,
}

impl From<&Todo> for TodoDocument {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id.object_id(),
            title: todo.title.clone(),
            completed: todo.completed,
            completed_at: BsonDateTime::from_millis(todo.created_at.timestamp_millis()),
        }
    }
}

impl TryFrom<TodoDocument> for Todo {
    type Error = StoreError;

    fn try_from(doc: TodoDocument) -> Result<Self, Self::Error> {
        let millis = doc.completed_at.timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            StoreError::Decode(format!("timestamp {millis} out of range for todo {}", doc.id))
        })?;
        Ok(Self {
            id: doc.id.into(),
            title: doc.title,
            completed: doc.completed,
            created_at,
        })
    }
}

fn by_id(id: TodoId) -> Document {
    doc! { "id": id.object_id() }
}

/// `TodoStore` backed by a MongoDB collection. The driver's client is
/// pooled and cheap to clone, so one instance serves every request.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    collection: Collection<TodoDocument>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(config.uri.as_str())
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        options.app_name = Some("todo-server".into());
        options.connect_timeout = Some(config.connect_timeout());
        options.server_selection_timeout = Some(config.connect_timeout());

        let client = Client::with_options(options).map_err(|e| StoreError::Connect(e.to_string()))?;
        let collection = client
            .database(&config.database)
            .collection::<TodoDocument>(&config.collection);
        Ok(Self { client, collection })
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let docs: Vec<TodoDocument> = cursor.try_collect().await?;
        debug!(count = docs.len(), "fetched todos");
        docs.into_iter().map(Todo::try_from).collect()
    }

    async fn insert(&self, todo: &Todo) -> Result<TodoId, StoreError> {
        self.collection.insert_one(TodoDocument::from(todo)).await?;
        Ok(todo.id)
    }

    async fn update(&self, id: TodoId, update: &UpdateTodo) -> Result<u64, StoreError> {
        let change = doc! {
            "$set": { "title": update.title.as_str(), "completed": update.completed }
        };
        let result = self.collection.update_one(by_id(id), change).await?;
        Ok(result.modified_count)
    }

    async fn delete(&self, id: TodoId) -> Result<u64, StoreError> {
        let result = self.collection.delete_one(by_id(id)).await?;
        Ok(result.deleted_count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;
        Ok(())
    }

    /// Does not wait for cursors or sessions still held by abandoned
    /// requests.
    async fn close(&self) {
        self.client.clone().shutdown().immediate(true).await;
    }
}
