//! Derives the visible list from the loaded todos: filter, then search, then
//! sort. Everything here is pure and cheap enough to re-run on every change.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::todo::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Title,
    #[default]
    CreatedAt,
    UpdatedAt,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl Filter {
    fn keeps(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => todo.completed,
            Filter::Incomplete => !todo.completed,
        }
    }
}

impl SortKey {
    fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortKey::Completed => a.completed.cmp(&b.completed),
        }
    }
}

/// Case-insensitive substring match on title or description. A blank query
/// matches everything.
pub fn matches_search(todo: &Todo, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    todo.title.to_lowercase().contains(&query)
        || todo
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&query))
}

pub fn filter_todos<'a, I>(todos: I, filter: Filter, query: &str) -> Vec<Todo>
where
    I: IntoIterator<Item = &'a Todo>,
{
    todos
        .into_iter()
        .filter(|todo| filter.keeps(todo) && matches_search(todo, query))
        .cloned()
        .collect()
}

/// Stable: todos that compare equal keep their relative order in both
/// directions.
pub fn sort_todos(mut todos: Vec<Todo>, key: SortKey, order: SortOrder) -> Vec<Todo> {
    todos.sort_by(|a, b| match order {
        SortOrder::Asc => key.compare(a, b),
        SortOrder::Desc => key.compare(a, b).reverse(),
    });
    todos
}

pub fn filter_and_sort(
    todos: &[Todo],
    filter: Filter,
    query: &str,
    key: SortKey,
    order: SortOrder,
) -> Vec<Todo> {
    sort_todos(filter_todos(todos, filter, query), key, order)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use uuid::Uuid;

    /// Todo created `minutes` after a fixed epoch.
    pub fn todo(title: &str, completed: bool, minutes: i64) -> Todo {
        let created_at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            completed,
            created_at,
            updated_at: created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::todo;
    use super::*;

    fn titles(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|t| t.title.as_str()).collect()
    }

    fn five_todos() -> Vec<Todo> {
        vec![
            todo("a", false, 0),
            todo("b", true, 1),
            todo("c", false, 2),
            todo("d", true, 3),
            todo("e", false, 4),
        ]
    }

    #[test]
    fn test_completed_filter_independent_of_sort() {
        let todos = five_todos();
        for key in [SortKey::Title, SortKey::CreatedAt, SortKey::UpdatedAt, SortKey::Completed] {
            for order in [SortOrder::Asc, SortOrder::Desc] {
                let visible = filter_and_sort(&todos, Filter::Completed, "", key, order);
                let mut got = titles(&visible);
                got.sort_unstable();
                assert_eq!(got, vec!["b", "d"]);
            }
        }
    }

    #[test]
    fn test_incomplete_filter() {
        let visible = filter_todos(&five_todos(), Filter::Incomplete, "");
        assert_eq!(titles(&visible), vec!["a", "c", "e"]);
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitively() {
        let mut with_description = todo("Groceries", false, 0);
        with_description.description = Some("Buy MILK and eggs".to_string());
        let todos = vec![with_description, todo("Milkshake recipe", true, 1), todo("Taxes", false, 2)];

        let visible = filter_todos(&todos, Filter::All, "  milk ");
        assert_eq!(titles(&visible), vec!["Groceries", "Milkshake recipe"]);

        let visible = filter_todos(&todos, Filter::Incomplete, "milk");
        assert_eq!(titles(&visible), vec!["Groceries"]);
    }

    #[test]
    fn test_title_sort_is_case_insensitive() {
        let todos = vec![todo("banana", false, 0), todo("Apple", false, 1), todo("cherry", false, 2)];

        let asc = sort_todos(todos.clone(), SortKey::Title, SortOrder::Asc);
        assert_eq!(titles(&asc), vec!["Apple", "banana", "cherry"]);

        let desc = sort_todos(todos, SortKey::Title, SortOrder::Desc);
        assert_eq!(titles(&desc), vec!["cherry", "banana", "Apple"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let todos = vec![
            todo("first", true, 0),
            todo("second", false, 1),
            todo("third", true, 2),
            todo("fourth", false, 3),
        ];

        let asc = sort_todos(todos.clone(), SortKey::Completed, SortOrder::Asc);
        assert_eq!(titles(&asc), vec!["second", "fourth", "first", "third"]);

        let desc = sort_todos(todos, SortKey::Completed, SortOrder::Desc);
        assert_eq!(titles(&desc), vec!["first", "third", "second", "fourth"]);
    }

    #[test]
    fn test_sort_by_timestamps() {
        let mut todos = vec![todo("old", false, 0), todo("new", false, 10), todo("mid", false, 5)];
        todos[0].updated_at = todos[1].created_at + chrono::Duration::minutes(1);

        let newest = sort_todos(todos.clone(), SortKey::CreatedAt, SortOrder::Desc);
        assert_eq!(titles(&newest), vec!["new", "mid", "old"]);

        let touched = sort_todos(todos, SortKey::UpdatedAt, SortOrder::Desc);
        assert_eq!(titles(&touched), vec!["old", "new", "mid"]);
    }
}
