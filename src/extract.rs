use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

/// JSON body extractor whose rejections render as [`AppError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// The `:id` path segment of a todo route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoId(pub Uuid);

pub fn parse_todo_id(raw: &str) -> Result<Uuid, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("Invalid todo id".to_string()));
    }
    Uuid::parse_str(raw).map_err(|_| AppError::Validation(format!("Invalid todo id: {raw}")))
}

#[async_trait]
impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        parse_todo_id(&raw).map(TodoId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_todo_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_todo_id(&id.to_string()).unwrap(), id);
        assert_eq!(parse_todo_id(&format!(" {id} ")).unwrap(), id);
        assert!(matches!(parse_todo_id("   "), Err(AppError::Validation(_))));
        assert!(matches!(parse_todo_id("42"), Err(AppError::Validation(_))));
    }
}
