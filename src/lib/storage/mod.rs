pub mod sqlite;

use async_trait::async_trait;
use crate::core::{Todo, TodoId};

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Creates the `todos` table if it does not exist.
    async fn initialize(&self) -> anyhow::Result<()>;
    async fn list_todos(&self) -> anyhow::Result<Vec<Todo>>;
    /// Inserts an already validated text with `done = false` and returns the new id.
    async fn insert_todo(&self, text: &str) -> anyhow::Result<TodoId>;
    async fn ping(&self) -> anyhow::Result<()>;
}
