use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::core::{NewTodo, Todo, TodoError, TodoId};
use crate::storage::TodoStore;

/// Validates requests at the service boundary and forwards them to the
/// store. Holds no state of its own between calls.
pub struct TodoService<S: TodoStore> {
    store: Arc<S>,
}

impl<S: TodoStore> Clone for TodoService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TodoStore> TodoService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// One-time schema setup. Must run before the first request is served;
    /// safe to repeat.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), TodoError> {
        self.store.initialize().await?;
        info!("Todo store initialized");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Todo>, TodoError> {
        let todos = self.store.list_todos().await?;
        debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    #[instrument(skip(self, request))]
    pub async fn add(&self, request: NewTodo) -> Result<TodoId, TodoError> {
        let text = request.validated_text()?;
        let id = self.store.insert_todo(text).await?;
        info!(id, "Created todo");
        Ok(id)
    }

    pub async fn ready(&self) -> Result<(), TodoError> {
        self.store.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records inserts so tests can assert what reached the store.
    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TodoStore for RecordingStore {
        async fn initialize(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn list_todos(&self) -> anyhow::Result<Vec<Todo>> {
            let inserted = self.inserted.lock().unwrap();
            Ok(inserted
                .iter()
                .enumerate()
                .map(|(i, text)| Todo {
                    id: i as TodoId + 1,
                    text: text.clone(),
                    done: false,
                })
                .collect())
        }

        async fn insert_todo(&self, text: &str) -> anyhow::Result<TodoId> {
            let mut inserted = self.inserted.lock().unwrap();
            inserted.push(text.to_string());
            Ok(inserted.len() as TodoId)
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn add_passes_trimmed_text_to_store() {
        let store = Arc::new(RecordingStore::default());
        let service = TodoService::new(store.clone());
        let id = service
            .add(NewTodo {
                text: Some("  buy milk  ".into()),
            })
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert_eq!(
            *store.inserted.lock().unwrap(),
            vec!["buy milk".to_string()]
        );
    }

    #[tokio::test]
    async fn add_rejects_blank_text_without_touching_store() {
        let store = Arc::new(RecordingStore::default());
        let service = TodoService::new(store.clone());
        let err = service
            .add(NewTodo {
                text: Some("   ".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::Validation(_)));
        assert!(store.inserted.lock().unwrap().is_empty());
        assert!(service.list().await.unwrap().is_empty());
    }
}
