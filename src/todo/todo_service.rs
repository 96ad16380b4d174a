use crate::error::{AppError, Result};
use crate::todo::todo_dto::{
    CreateTodoRequest, UpdateTodoRequest, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
use crate::todo::todo_models::{Todo, TodoChanges};
use crate::todo::todo_repository::TodoRepository;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Service layer for todo business rules: trimming, required titles and
/// monotonic `updated_at`.
#[derive(Clone)]
pub struct TodoService {
    repo: TodoRepository,
}

impl TodoService {
    pub fn new(repo: TodoRepository) -> Self {
        Self { repo }
    }

    pub async fn list_todos(&self) -> Result<Vec<Todo>> {
        self.repo.find_all().await
    }

    pub async fn get_todo(&self, id: Uuid) -> Result<Todo> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn create_todo(&self, payload: CreateTodoRequest) -> Result<Todo> {
        let title = required_title(&payload.title, "Title is required")?;
        let description = normalize_description(payload.description.as_deref());
        check_description(description.as_deref())?;

        let todo = self
            .repo
            .create(Uuid::new_v4(), &title, description.as_deref(), Utc::now())
            .await?;

        tracing::info!(todo_id = %todo.id, "Created todo");
        Ok(todo)
    }

    pub async fn update_todo(&self, id: Uuid, payload: UpdateTodoRequest) -> Result<Todo> {
        let existing = self.get_todo(id).await?;

        let title = payload
            .title
            .as_deref()
            .map(|t| required_title(t, "Title cannot be empty"))
            .transpose()?;

        let description = payload
            .description
            .map(|d| normalize_description(d.as_deref()));
        if let Some(description) = &description {
            check_description(description.as_deref())?;
        }

        let changes = TodoChanges {
            title,
            description,
            completed: payload.completed,
        };

        self.apply(&existing, &changes).await
    }

    pub async fn delete_todo(&self, id: Uuid) -> Result<()> {
        let rows_affected = self.repo.delete(id).await?;

        if rows_affected == 0 {
            return Err(not_found());
        }

        tracing::info!(todo_id = %id, "Deleted todo");
        Ok(())
    }

    pub async fn set_completed(&self, id: Uuid, completed: bool) -> Result<Todo> {
        let existing = self.get_todo(id).await?;
        self.apply(&existing, &TodoChanges::completed(completed)).await
    }

    async fn apply(&self, existing: &Todo, changes: &TodoChanges) -> Result<Todo> {
        let updated_at = next_updated_at(existing.updated_at, Utc::now());

        let todo = self
            .repo
            .update(existing.id, changes, updated_at)
            .await?
            .ok_or_else(not_found)?;

        tracing::debug!(todo_id = %todo.id, completed = todo.completed, "Updated todo");
        Ok(todo)
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Todo not found".to_string())
}

fn required_title(raw: &str, message: &str) -> Result<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::Validation(message.to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn check_description(description: Option<&str>) -> Result<()> {
    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        return Err(AppError::Validation(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

/// Blank descriptions are stored as NULL.
fn normalize_description(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Keeps `updated_at` strictly increasing even when the clock has not moved
/// since the previous write.
fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::milliseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}
