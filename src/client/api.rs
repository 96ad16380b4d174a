use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::todo::{CreateTodoRequest, ErrorResponse, Todo, UpdateTodoRequest};

pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

const NETWORK_ERROR: &str = "A network error occurred";

/// Every data-layer failure, server-reported or not, in one shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    /// HTTP status, or 0 when no response was received.
    pub status: u16,
    /// `code` from the server's error body, falling back to `status`.
    pub code: u16,
}

impl ApiError {
    pub fn network(detail: impl std::fmt::Display) -> Self {
        tracing::debug!("Request failed before a response arrived: {}", detail);
        Self {
            message: NETWORK_ERROR.to_string(),
            status: 0,
            code: 0,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::network(err)
    }
}

/// The operations the client state layer needs from the server.
#[async_trait]
pub trait TodoBackend: Send + Sync {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError>;
    async fn fetch_todo(&self, id: Uuid) -> Result<Todo, ApiError>;
    async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ApiError>;
    async fn update_todo(&self, id: Uuid, request: &UpdateTodoRequest) -> Result<Todo, ApiError>;
    async fn delete_todo(&self, id: Uuid) -> Result<(), ApiError>;
    async fn complete_todo(&self, id: Uuid) -> Result<Todo, ApiError>;
    async fn uncomplete_todo(&self, id: Uuid) -> Result<Todo, ApiError>;
}

/// HTTP client for the todo REST API.
#[derive(Clone)]
pub struct TodoApi {
    http: Client,
    base_url: String,
}

impl TodoApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/todos{}", self.base_url, path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let fallback_code = status.as_u16();
        let error = match response.json::<ErrorResponse>().await {
            Ok(body) => ApiError {
                message: if body.error.is_empty() {
                    NETWORK_ERROR.to_string()
                } else {
                    body.error
                },
                status: status.as_u16(),
                code: if body.code == 0 { fallback_code } else { body.code },
            },
            Err(_) => ApiError {
                message: NETWORK_ERROR.to_string(),
                status: status.as_u16(),
                code: fallback_code,
            },
        };

        tracing::debug!(status = error.status, code = error.code, "API error: {}", error.message);
        Err(error)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TodoBackend for TodoApi {
    async fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        self.send_json(self.request(Method::GET, "")).await
    }

    async fn fetch_todo(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/{id}"))).await
    }

    async fn create_todo(&self, request: &CreateTodoRequest) -> Result<Todo, ApiError> {
        self.send_json(self.request(Method::POST, "").json(request)).await
    }

    async fn update_todo(&self, id: Uuid, request: &UpdateTodoRequest) -> Result<Todo, ApiError> {
        self.send_json(self.request(Method::PUT, &format!("/{id}")).json(request))
            .await
    }

    async fn delete_todo(&self, id: Uuid) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &format!("/{id}"))).await?;
        Ok(())
    }

    async fn complete_todo(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.send_json(self.request(Method::PUT, &format!("/{id}/complete")))
            .await
    }

    async fn uncomplete_todo(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.send_json(self.request(Method::PUT, &format!("/{id}/uncomplete")))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::test_pool, routes::create_router, state::{AppState, Config}};
    use std::sync::Arc;

    /// Serves the real router on an ephemeral port.
    async fn spawn_server() -> TodoApi {
        let state = AppState::new(test_pool().await, Arc::new(Config::default()));
        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        TodoApi::new(format!("http://{addr}/api/"))
    }

    #[tokio::test]
    async fn test_round_trip_against_server() {
        let api = spawn_server().await;

        let created = api
            .create_todo(&CreateTodoRequest {
                title: "Call plumber".to_string(),
                description: None,
            })
            .await
            .unwrap();
        assert_eq!(api.fetch_todo(created.id).await.unwrap(), created);

        let completed = api.complete_todo(created.id).await.unwrap();
        assert!(completed.completed);
        let reopened = api.uncomplete_todo(created.id).await.unwrap();
        assert!(!reopened.completed);

        let renamed = api
            .update_todo(
                created.id,
                &UpdateTodoRequest {
                    title: Some("Call electrician".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.title, "Call electrician");

        assert_eq!(api.fetch_todos().await.unwrap().len(), 1);
        api.delete_todo(created.id).await.unwrap();
        assert!(api.fetch_todos().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_errors_are_normalized() {
        let api = spawn_server().await;

        let err = api.fetch_todo(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status, 404);
        assert_eq!(err.code, 404);
        assert_eq!(err.message, "Todo not found");
        assert!(err.is_not_found());

        let err = api
            .create_todo(&CreateTodoRequest {
                title: " ".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status, 400);
        assert_eq!(err.code, 400);
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = TodoApi::new(format!("http://{addr}/api"));
        let err = api.fetch_todos().await.unwrap_err();
        assert_eq!(err.status, 0);
        assert_eq!(err.message, NETWORK_ERROR);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        assert_eq!(TodoApi::new("http://x/api/").base_url(), "http://x/api");
    }
}
