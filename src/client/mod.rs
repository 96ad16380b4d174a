//! Client side of the todo app: HTTP data layer, list state, the
//! filter/sort/export pipeline, preferences and terminal rendering.

pub mod api;
pub mod export;
pub mod format;
pub mod list_state;
pub mod pipeline;
pub mod preferences;
pub mod toast;
pub mod view;

pub use api::{ApiError, TodoApi, TodoBackend, DEFAULT_API_URL};
pub use export::ExportFormat;
pub use list_state::{BulkOutcome, ListError, RowState, TaskList};
pub use pipeline::{Filter, SortKey, SortOrder};
pub use preferences::{Preferences, PreferencesStore};
pub use toast::{Toast, ToastKind, Toasts};
