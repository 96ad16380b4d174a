use crate::{
    error::AppError,
    state::AppState,
    todo::{todo_handlers, CreateTodoRequest, ErrorResponse, HealthResponse, Todo, UpdateTodoRequest},
};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put, MethodRouter},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        todo_handlers::list_todos,
        todo_handlers::get_todo,
        todo_handlers::create_todo,
        todo_handlers::update_todo,
        todo_handlers::delete_todo,
        todo_handlers::complete_todo,
        todo_handlers::uncomplete_todo,
    ),
    components(
        schemas(
            Todo,
            CreateTodoRequest,
            UpdateTodoRequest,
            ErrorResponse,
            HealthResponse,
        )
    ),
    tags(
        (name = "todos", description = "Todo management endpoints")
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let todo_routes = Router::new()
        .route(
            "/",
            or_not_found(get(todo_handlers::list_todos).post(todo_handlers::create_todo)),
        )
        .route(
            "/:id",
            or_not_found(
                get(todo_handlers::get_todo)
                    .put(todo_handlers::update_todo)
                    .delete(todo_handlers::delete_todo),
            ),
        )
        .route("/:id/complete", or_not_found(put(todo_handlers::complete_todo)))
        .route("/:id/uncomplete", or_not_found(put(todo_handlers::uncomplete_todo)));

    let api_routes = Router::new().nest("/todos", todo_routes);

    Router::new()
        .route("/", or_not_found(get(health_check)))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Unsupported methods on a known path answer like unknown paths.
fn or_not_found(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(not_found)
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Todo API server is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    let body = Json(json!({
        "error": "Internal server error",
        "code": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
    }));
    (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
}
