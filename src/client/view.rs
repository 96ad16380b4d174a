use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use std::fmt::Write;
use uuid::Uuid;

use super::{
    export::completed_label,
    format::{relative_time, short_id},
    toast::{Toast, ToastKind},
};
use crate::todo::{
    todo_dto::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS},
    Todo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub done: Color,
    pub error: Color,
}

impl Theme {
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self {
                text: Color::White,
                muted: Color::Grey,
                accent: Color::Cyan,
                done: Color::Green,
                error: Color::Red,
            }
        } else {
            Self {
                text: Color::Black,
                muted: Color::DarkGrey,
                accent: Color::DarkBlue,
                done: Color::DarkGreen,
                error: Color::DarkRed,
            }
        }
    }
}

/// Field errors from the create/edit form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = [&self.title, &self.description]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for FormErrors {}

/// A submitted form, trimmed. A blank description becomes `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoForm {
    pub title: String,
    pub description: Option<String>,
}

pub fn validate_form(title: &str, description: Option<&str>) -> Result<TodoForm, FormErrors> {
    let mut errors = FormErrors::default();
    let title = title.trim();

    if title.is_empty() {
        errors.title = Some("Title is required".to_string());
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.title = Some(format!("Title must be at most {TITLE_MAX_CHARS} characters"));
    }

    if description.is_some_and(|d| d.chars().count() > DESCRIPTION_MAX_CHARS) {
        errors.description = Some(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TodoForm {
        title: title.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
    })
}

fn row(todo: &Todo, selected: bool, theme: &Theme, now: DateTime<Utc>) -> String {
    let check = if todo.completed { "[x]" } else { "[ ]" };
    let marker = if selected { "*" } else { " " };
    let title = if todo.completed {
        todo.title.clone().with(theme.done).crossed_out().to_string()
    } else {
        todo.title.clone().with(theme.text).to_string()
    };

    format!(
        "{marker}{} {} {title}  {}",
        check.with(theme.accent),
        short_id(&todo.id).with(theme.muted),
        relative_time(todo.created_at, now).with(theme.muted),
    )
}

/// The list screen: header with counts, then one row per visible todo.
pub fn render_list(
    visible: &[Todo],
    total: usize,
    selected: &[Uuid],
    theme: &Theme,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}",
        format!("Todos ({} of {})", visible.len(), total).with(theme.accent).bold()
    );
    if !selected.is_empty() {
        let _ = writeln!(out, "{}", format!("{} selected", selected.len()).with(theme.muted));
    }

    if visible.is_empty() {
        let message = if total == 0 {
            "No todos yet. Add one with `todo add <title>`."
        } else {
            "No todos match the current filter."
        };
        let _ = writeln!(out, "{}", message.with(theme.muted));
        return out;
    }

    for todo in visible {
        let _ = writeln!(out, "{}", row(todo, selected.contains(&todo.id), theme, now));
    }
    out
}

/// The detail screen for a single todo.
pub fn render_todo(todo: &Todo, theme: &Theme, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", todo.title.clone().with(theme.text).bold());
    if let Some(description) = &todo.description {
        let _ = writeln!(out, "{description}");
    }
    let _ = writeln!(out, "{} {}", "id:".with(theme.muted), todo.id);
    let status_color = if todo.completed { theme.done } else { theme.accent };
    let _ = writeln!(
        out,
        "{} {}",
        "status:".with(theme.muted),
        completed_label(todo.completed).with(status_color)
    );
    let _ = writeln!(
        out,
        "{} {}",
        "created:".with(theme.muted),
        relative_time(todo.created_at, now)
    );
    let _ = writeln!(
        out,
        "{} {}",
        "updated:".with(theme.muted),
        relative_time(todo.updated_at, now)
    );
    out
}

pub fn render_toast(toast: &Toast, theme: &Theme) -> String {
    match toast.kind {
        ToastKind::Success => format!("{} {}", "✓".with(theme.done), toast.message),
        ToastKind::Error => format!("{} {}", "✗".with(theme.error), toast.message.clone().with(theme.error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::pipeline::fixtures::todo;

    #[test]
    fn test_validate_form_trims_and_accepts() {
        let form = validate_form("  Buy bread ", Some("   ")).unwrap();
        assert_eq!(form.title, "Buy bread");
        assert_eq!(form.description, None);
    }

    #[test]
    fn test_validate_form_reports_each_field() {
        let errors = validate_form("   ", Some("x".repeat(501).as_str())).unwrap_err();
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert!(errors.description.is_some());

        let errors = validate_form(&"t".repeat(101), None).unwrap_err();
        assert!(errors.title.unwrap().contains("100"));
        assert!(validate_form(&"t".repeat(100), Some("d".repeat(500).as_str())).is_ok());
    }

    #[test]
    fn test_render_list_shows_counts_and_rows() {
        let todos = vec![todo("Walk dog", false, 0), todo("Feed cat", true, 1)];
        let theme = Theme::for_mode(false);
        let now = todos[1].created_at;

        let out = render_list(&todos[..1], todos.len(), &[todos[0].id], &theme, now);

        assert!(out.contains("Todos (1 of 2)"));
        assert!(out.contains("1 selected"));
        assert!(out.contains("Walk dog"));
        assert!(!out.contains("Feed cat"));
    }

    #[test]
    fn test_render_list_empty_states() {
        let theme = Theme::for_mode(true);
        let now = Utc::now();
        assert!(render_list(&[], 0, &[], &theme, now).contains("No todos yet"));
        assert!(render_list(&[], 3, &[], &theme, now).contains("No todos match"));
    }

    #[test]
    fn test_render_todo_includes_status() {
        let mut done = todo("Return books", true, 0);
        done.description = Some("library closes at 6".to_string());
        let out = render_todo(&done, &Theme::for_mode(false), done.created_at);
        assert!(out.contains("Return books"));
        assert!(out.contains("library closes at 6"));
        assert!(out.contains("Completed"));
        assert!(out.contains(&done.id.to_string()));
    }
}
