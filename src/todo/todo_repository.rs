use crate::{db::DbPool, error::Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::todo_models::{Todo, TodoChanges};

#[derive(Clone)]
pub struct TodoRepository {
    pool: DbPool,
}

impl TodoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<Todo>> {
        let todos = sqlx::query_as::<_, Todo>("SELECT * FROM todos ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(todos)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    pub async fn create(
        &self,
        id: Uuid,
        title: &str,
        description: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Todo> {
        let todo = sqlx::query_as::<_, Todo>(
            "INSERT INTO todos (id, title, description, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, FALSE, ?4, ?4)
             RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    /// Applies only the fields present in `changes`. Returns `None` when no
    /// row has this id.
    pub async fn update(
        &self,
        id: Uuid,
        changes: &TodoChanges,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Todo>> {
        let todo = sqlx::query_as::<_, Todo>(
            "UPDATE todos SET
                title = COALESCE(?1, title),
                description = CASE WHEN ?2 THEN ?3 ELSE description END,
                completed = COALESCE(?4, completed),
                updated_at = ?5
             WHERE id = ?6
             RETURNING *",
        )
        .bind(changes.title.as_deref())
        .bind(changes.description.is_some())
        .bind(changes.description.clone().flatten())
        .bind(changes.completed)
        .bind(updated_at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
