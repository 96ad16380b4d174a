pub mod todo_dto;
pub mod todo_handlers;
pub mod todo_models;
pub mod todo_repository;
pub mod todo_service;

pub use todo_dto::{CreateTodoRequest, ErrorResponse, HealthResponse, UpdateTodoRequest};
pub use todo_handlers::{
    complete_todo, create_todo, delete_todo, get_todo, list_todos, uncomplete_todo, update_todo,
};
pub use todo_models::{Todo, TodoChanges};
pub use todo_repository::TodoRepository;
pub use todo_service::TodoService;
