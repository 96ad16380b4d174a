use futures::future::join_all;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use super::{
    api::{ApiError, TodoBackend},
    pipeline::{filter_and_sort, Filter, SortKey, SortOrder},
    preferences::{Preferences, PreferencesStore},
    toast::Toasts,
};
use crate::todo::{CreateTodoRequest, Todo, UpdateTodoRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Idle,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("todo {0} already has a request in flight")]
    Busy(Uuid),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Per-id results of a bulk operation. Successful calls are applied locally
/// even when others fail; nothing is rolled back.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<(Uuid, ApiError)>,
}

impl BulkOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Client-side state of the task list: the loaded todos, per-row request
/// state, the multi-select set and the view preferences.
pub struct TaskList {
    todos: Vec<Todo>,
    pending: HashSet<Uuid>,
    selection: Vec<Uuid>,
    preferences: Preferences,
    store: Option<PreferencesStore>,
    toasts: Toasts,
}

impl TaskList {
    pub fn new(preferences: Preferences, store: Option<PreferencesStore>) -> Self {
        Self {
            todos: Vec::new(),
            pending: HashSet::new(),
            selection: Vec::new(),
            preferences,
            store,
            toasts: Toasts::default(),
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn find(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Filtered and sorted according to the current preferences.
    pub fn visible(&self) -> Vec<Todo> {
        let p = &self.preferences;
        filter_and_sort(&self.todos, p.filter, &p.search, p.sort_by, p.sort_order)
    }

    pub fn row_state(&self, id: Uuid) -> RowState {
        if self.pending.contains(&id) {
            RowState::Pending
        } else {
            RowState::Idle
        }
    }

    pub fn toasts(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// The single write path for preferences; persists after every change.
    pub fn update_preferences(&mut self, change: impl FnOnce(&mut Preferences)) {
        let before = self.preferences.clone();
        change(&mut self.preferences);
        if self.preferences != before {
            if let Some(store) = &self.store {
                store.save(&self.preferences);
            }
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.update_preferences(|p| p.filter = filter);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        self.update_preferences(|p| p.search = search);
    }

    pub fn set_sort(&mut self, key: SortKey, order: SortOrder) {
        self.update_preferences(|p| {
            p.sort_by = key;
            p.sort_order = order;
        });
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.update_preferences(|p| p.dark_mode = dark_mode);
    }

    pub async fn load(&mut self, backend: &dyn TodoBackend) -> Result<(), ApiError> {
        match backend.fetch_todos().await {
            Ok(todos) => {
                self.todos = todos;
                self.selection.retain(|id| self.todos.iter().any(|t| t.id == *id));
                Ok(())
            }
            Err(e) => {
                self.toasts.error(e.message.clone());
                Err(e)
            }
        }
    }

    pub async fn create(
        &mut self,
        backend: &dyn TodoBackend,
        request: &CreateTodoRequest,
    ) -> Result<Todo, ApiError> {
        let result = backend.create_todo(request).await;
        match &result {
            Ok(todo) => {
                self.todos.insert(0, todo.clone());
                self.toasts.success("Todo created");
            }
            Err(e) => {
                self.toasts.error(e.message.clone());
            }
        }
        result
    }

    pub async fn edit(
        &mut self,
        backend: &dyn TodoBackend,
        id: Uuid,
        request: &UpdateTodoRequest,
    ) -> Result<Todo, ListError> {
        self.begin(id)?;
        let result = backend.update_todo(id, request).await;
        self.finish(id, result, "Todo updated")
    }

    pub async fn toggle(
        &mut self,
        backend: &dyn TodoBackend,
        id: Uuid,
        completed: bool,
    ) -> Result<Todo, ListError> {
        self.begin(id)?;
        let result = if completed {
            backend.complete_todo(id).await
        } else {
            backend.uncomplete_todo(id).await
        };
        let message = if completed {
            "Todo marked as completed"
        } else {
            "Todo marked as incomplete"
        };
        self.finish(id, result, message)
    }

    pub async fn delete(&mut self, backend: &dyn TodoBackend, id: Uuid) -> Result<(), ListError> {
        self.begin(id)?;
        let result = backend.delete_todo(id).await;
        self.pending.remove(&id);

        match result {
            Ok(()) => {
                self.remove_local(&[id]);
                self.toasts.success("Todo deleted");
                Ok(())
            }
            Err(e) => {
                self.toasts.error(e.message.clone());
                Err(e.into())
            }
        }
    }

    fn begin(&mut self, id: Uuid) -> Result<(), ListError> {
        if !self.pending.insert(id) {
            return Err(ListError::Busy(id));
        }
        Ok(())
    }

    fn finish(
        &mut self,
        id: Uuid,
        result: Result<Todo, ApiError>,
        success: &str,
    ) -> Result<Todo, ListError> {
        self.pending.remove(&id);
        match result {
            Ok(todo) => {
                self.replace_local(todo.clone());
                self.toasts.success(success);
                Ok(todo)
            }
            Err(e) => {
                self.toasts.error(e.message.clone());
                Err(e.into())
            }
        }
    }

    fn replace_local(&mut self, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id == todo.id) {
            *slot = todo;
        }
    }

    fn remove_local(&mut self, ids: &[Uuid]) {
        self.todos.retain(|t| !ids.contains(&t.id));
        self.selection.retain(|id| !ids.contains(id));
    }

    pub fn selected(&self) -> &[Uuid] {
        &self.selection
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selection.contains(&id)
    }

    pub fn select(&mut self, id: Uuid, selected: bool) {
        if selected {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        } else {
            self.selection.retain(|s| *s != id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Completes every selected todo, one concurrent call per id. Ids that
    /// failed stay selected so the user can retry them.
    pub async fn bulk_complete(&mut self, backend: &dyn TodoBackend) -> BulkOutcome {
        let ids = self.selection.clone();
        let results = join_all(ids.iter().map(|id| backend.complete_todo(*id))).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(todo) => {
                    self.replace_local(todo);
                    outcome.succeeded.push(id);
                }
                Err(e) => outcome.failed.push((id, e)),
            }
        }

        self.selection.retain(|id| !outcome.succeeded.contains(id));
        self.report_bulk(&outcome, "completed");
        outcome
    }

    /// Deletes every selected todo, one concurrent call per id.
    pub async fn bulk_delete(&mut self, backend: &dyn TodoBackend) -> BulkOutcome {
        let ids = self.selection.clone();
        let results = join_all(ids.iter().map(|id| backend.delete_todo(*id))).await;

        let mut outcome = BulkOutcome::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => outcome.succeeded.push(id),
                Err(e) => outcome.failed.push((id, e)),
            }
        }

        self.remove_local(&outcome.succeeded);
        self.report_bulk(&outcome, "deleted");
        outcome
    }

    fn report_bulk(&mut self, outcome: &BulkOutcome, verb: &str) {
        if !outcome.succeeded.is_empty() {
            self.toasts
                .success(format!("{} todos {}", outcome.succeeded.len(), verb));
        }
        if !outcome.failed.is_empty() {
            tracing::warn!(
                failed = outcome.failed.len(),
                attempted = outcome.attempted(),
                "Bulk operation partially failed"
            );
            self.toasts.error(format!(
                "{} of {} todos could not be {}",
                outcome.failed.len(),
                outcome.attempted(),
                verb
            ));
        }
    }
}
