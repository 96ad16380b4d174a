use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTodoRequest {
    #[serde(default)]
    #[validate(custom(function = "title_within_limit"))]
    pub title: String,
    #[validate(custom(function = "description_within_limit"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update. A field left out of the body is left untouched; an
/// explicit `"description": null` clears the description.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateTodoRequest {
    #[validate(custom(function = "title_within_limit"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Limits apply to the trimmed text, which is what gets stored.
fn title_within_limit(title: &str) -> Result<(), ValidationError> {
    within_limit(title, TITLE_MAX_CHARS, "Title")
}

fn description_within_limit(description: &str) -> Result<(), ValidationError> {
    within_limit(description, DESCRIPTION_MAX_CHARS, "Description")
}

fn within_limit(value: &str, max: usize, field: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() > max {
        return Err(ValidationError::new("length")
            .with_message(format!("{field} must be at most {max} characters").into()));
    }
    Ok(())
}

fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub message: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}
