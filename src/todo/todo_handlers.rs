use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    error::Result,
    extract::{AppJson, TodoId},
    state::AppState,
};
use super::{
    todo_dto::{CreateTodoRequest, ErrorResponse, UpdateTodoRequest},
    todo_models::Todo,
};

/// List every todo, newest first
#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "All todos ordered by creation time, newest first", body = Vec<Todo>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn list_todos(State(state): State<AppState>) -> Result<Json<Vec<Todo>>> {
    let todos = state.todo_service.list_todos().await?;
    Ok(Json(todos))
}

/// Get a single todo by ID
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo found", body = Todo),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn get_todo(State(state): State<AppState>, TodoId(id): TodoId) -> Result<Json<Todo>> {
    let todo = state.todo_service.get_todo(id).await?;
    Ok(Json(todo))
}

/// Create a new todo
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = Todo),
        (status = 400, description = "Validation error", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn create_todo(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTodoRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let todo = state.todo_service.create_todo(payload).await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

/// Update the given fields of a todo
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = Todo),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn update_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
    AppJson(payload): AppJson<UpdateTodoRequest>,
) -> Result<Json<Todo>> {
    payload.validate()?;

    let todo = state.todo_service.update_todo(id, payload).await?;

    Ok(Json(todo))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 400, description = "Malformed id", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn delete_todo(State(state): State<AppState>, TodoId(id): TodoId) -> Result<StatusCode> {
    state.todo_service.delete_todo(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a todo as completed
#[utoipa::path(
    put,
    path = "/api/todos/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo completed", body = Todo),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn complete_todo(State(state): State<AppState>, TodoId(id): TodoId) -> Result<Json<Todo>> {
    let todo = state.todo_service.set_completed(id, true).await?;
    Ok(Json(todo))
}

/// Mark a todo as not completed
#[utoipa::path(
    put,
    path = "/api/todos/{id}/uncomplete",
    params(
        ("id" = Uuid, Path, description = "Todo ID")
    ),
    responses(
        (status = 200, description = "Todo reopened", body = Todo),
        (status = 404, description = "Todo not found", body = ErrorResponse)
    ),
    tag = "todos"
)]
pub async fn uncomplete_todo(
    State(state): State<AppState>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>> {
    let todo = state.todo_service.set_completed(id, false).await?;
    Ok(Json(todo))
}
