use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TodoStore;
use crate::error::StoreError;
use crate::model::{Todo, TodoId, UpdateTodo};

/// In-process store. Todos are kept in insertion order, which stands in for
/// the natural order a document store returns.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Ok(self.todos.read().await.clone())
    }

    async fn insert(&self, todo: &Todo) -> Result<TodoId, StoreError> {
        self.todos.write().await.push(todo.clone());
        Ok(todo.id)
    }

    async fn update(&self, id: TodoId, update: &UpdateTodo) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|todo| todo.id == id) else {
            return Ok(0);
        };
        if todo.title == update.title && todo.completed == update.completed {
            return Ok(0);
        }
        todo.title.clone_from(&update.title);
        todo.completed = update.completed;
        Ok(1)
    }

    async fn delete(&self, id: TodoId) -> Result<u64, StoreError> {
        let mut todos = self.todos.write().await;
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        Ok((before - todos.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(title: &str, completed: bool) -> UpdateTodo {
        UpdateTodo {
            title: title.to_string(),
            completed,
        }
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = MemoryStore::new();
        let first = Todo::new("first");
        let second = Todo::new("second");
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let todos = store.list().await.unwrap();
        assert_eq!(todos, vec![first, second]);
    }

    #[tokio::test]
    async fn update_counts_only_real_changes() {
        let store = MemoryStore::new();
        let todo = Todo::new("same");
        store.insert(&todo).await.unwrap();

        assert_eq!(store.update(todo.id, &update("same", false)).await.unwrap(), 0);
        assert_eq!(store.update(todo.id, &update("same", true)).await.unwrap(), 1);
        assert_eq!(store.update(TodoId::new(), &update("x", true)).await.unwrap(), 0);

        let stored = &store.list().await.unwrap()[0];
        assert!(stored.completed);
        assert_eq!(stored.created_at, todo.created_at);
    }

    #[tokio::test]
    async fn delete_reports_matched_count() {
        let store = MemoryStore::new();
        let todo = Todo::new("gone");
        store.insert(&todo).await.unwrap();

        assert_eq!(store.delete(todo.id).await.unwrap(), 1);
        assert_eq!(store.delete(todo.id).await.unwrap(), 0);
        assert!(store.list().await.unwrap().is_empty());
    }
}
