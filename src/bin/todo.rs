use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use todo_app::{
    client::{
        export::write_export,
        format::short_id,
        view::{render_list, render_toast, render_todo, validate_form, Theme},
        BulkOutcome, ExportFormat, Filter, PreferencesStore, SortKey, SortOrder, TaskList,
        TodoApi, TodoBackend, DEFAULT_API_URL,
    },
    todo::{CreateTodoRequest, UpdateTodoRequest},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Terminal client for the todo API
#[derive(Parser, Debug)]
#[command(name = "todo", author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the API, including the /api prefix
    #[arg(long, env = "TODO_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Preferences file (defaults to the platform config dir)
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeMode {
    Light,
    Dark,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the todos matching the saved filter, search and sort
    List,

    /// Show a single todo
    Show { id: Uuid },

    /// Create a todo
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Change the title, description or completion of a todo
    Edit {
        id: Uuid,
        #[arg(short, long)]
        title: Option<String>,
        /// An empty string clears the description
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        completed: Option<bool>,
    },

    /// Mark a todo as completed
    Done { id: Uuid },

    /// Mark a todo as not completed
    Undone { id: Uuid },

    /// Delete a todo
    Rm {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Set the saved status filter
    Filter { filter: Filter },

    /// Set the saved search text; no words clears it
    Search { words: Vec<String> },

    /// Set the saved sort key and direction
    Sort {
        key: SortKey,
        order: Option<SortOrder>,
    },

    /// Switch between the light and dark palettes
    Theme { mode: ThemeMode },

    /// Write the currently visible todos to a file
    Export {
        format: ExportFormat,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Complete several todos at once
    BulkComplete {
        #[arg(required = true)]
        ids: Vec<Uuid>,
    },

    /// Delete several todos at once
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<Uuid>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "todo_app=debug,todo=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let store = cli
        .preferences
        .map(PreferencesStore::new)
        .unwrap_or_else(PreferencesStore::default_location);
    tracing::debug!("Using preferences at {}", store.path().display());

    let api = TodoApi::new(cli.api_url);
    let mut list = TaskList::new(store.load(), Some(store));

    let result = run(cli.command, &api, &mut list).await;

    let theme = Theme::for_mode(list.preferences().dark_mode);
    for toast in list.toasts().drain() {
        eprintln!("{}", render_toast(&toast, &theme));
    }

    result
}

async fn run(command: Command, api: &TodoApi, list: &mut TaskList) -> anyhow::Result<()> {
    let theme = Theme::for_mode(list.preferences().dark_mode);
    let now = chrono::Utc::now();

    match command {
        Command::List => {
            list.load(api).await?;
            print_list(list, &theme);
        }
        Command::Show { id } => {
            let todo = api.fetch_todo(id).await?;
            print!("{}", render_todo(&todo, &theme, now));
        }
        Command::Add { title, description } => {
            let form = validate_form(&title, description.as_deref())?;
            let request = CreateTodoRequest {
                title: form.title,
                description: form.description,
            };
            let todo = list.create(api, &request).await?;
            print!("{}", render_todo(&todo, &theme, now));
        }
        Command::Edit {
            id,
            title,
            description,
            completed,
        } => {
            if title.is_none() && description.is_none() && completed.is_none() {
                bail!("nothing to change: pass --title, --description or --completed");
            }

            let current = api.fetch_todo(id).await?;
            let form = validate_form(
                title.as_deref().unwrap_or(&current.title),
                description.as_deref().or(current.description.as_deref()),
            )?;

            let request = UpdateTodoRequest {
                title: title.map(|_| form.title),
                description: description.map(|_| form.description),
                completed,
            };
            let todo = list.edit(api, id, &request).await?;
            print!("{}", render_todo(&todo, &theme, now));
        }
        Command::Done { id } => {
            let todo = list.toggle(api, id, true).await?;
            print!("{}", render_todo(&todo, &theme, now));
        }
        Command::Undone { id } => {
            let todo = list.toggle(api, id, false).await?;
            print!("{}", render_todo(&todo, &theme, now));
        }
        Command::Rm { id, yes } => {
            if !yes {
                let todo = api.fetch_todo(id).await?;
                if !confirm(&format!("Delete \"{}\"? This cannot be undone.", todo.title))? {
                    return Ok(());
                }
            }
            list.delete(api, id).await?;
        }
        Command::Filter { filter } => {
            list.set_filter(filter);
            list.load(api).await?;
            print_list(list, &theme);
        }
        Command::Search { words } => {
            list.set_search(words.join(" "));
            list.load(api).await?;
            print_list(list, &theme);
        }
        Command::Sort { key, order } => {
            let order = order.unwrap_or(list.preferences().sort_order);
            list.set_sort(key, order);
            list.load(api).await?;
            print_list(list, &theme);
        }
        Command::Theme { mode } => {
            list.set_dark_mode(mode == ThemeMode::Dark);
        }
        Command::Export { format, output } => {
            list.load(api).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format.default_file_name()));
            let visible = list.visible();
            write_export(&path, &visible, format)
                .with_context(|| format!("exporting to {}", path.display()))?;
            list.toasts()
                .success(format!("Exported {} todos to {}", visible.len(), path.display()));
        }
        Command::BulkComplete { ids } => {
            list.load(api).await?;
            select_all(list, &ids);
            let outcome = list.bulk_complete(api).await;
            print_list(list, &theme);
            check_bulk(&outcome, "complete")?;
        }
        Command::BulkDelete { ids, yes } => {
            if !yes && !confirm(&format!("Delete {} todos? This cannot be undone.", ids.len()))? {
                return Ok(());
            }
            list.load(api).await?;
            select_all(list, &ids);
            let outcome = list.bulk_delete(api).await;
            print_list(list, &theme);
            check_bulk(&outcome, "delete")?;
        }
    }

    Ok(())
}

fn print_list(list: &TaskList, theme: &Theme) {
    let visible = list.visible();
    print!(
        "{}",
        render_list(&visible, list.todos().len(), list.selected(), theme, chrono::Utc::now())
    );
}

fn select_all(list: &mut TaskList, ids: &[Uuid]) {
    for id in ids {
        list.select(*id, true);
    }
}

fn check_bulk(outcome: &BulkOutcome, verb: &str) -> anyhow::Result<()> {
    if outcome.is_success() {
        return Ok(());
    }
    let failed: Vec<String> = outcome
        .failed
        .iter()
        .map(|(id, e)| format!("{} ({})", short_id(id), e.message))
        .collect();
    bail!("could not {verb}: {}", failed.join(", "))
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_sort_and_bulk_commands() {
        let cli = Cli::try_parse_from(["todo", "sort", "title", "asc"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Sort { key: SortKey::Title, order: Some(SortOrder::Asc) }
        ));

        let id = Uuid::new_v4().to_string();
        let cli = Cli::try_parse_from(["todo", "bulk-delete", "--yes", id.as_str()]).unwrap();
        assert!(matches!(cli.command, Command::BulkDelete { ref ids, yes: true } if ids.len() == 1));

        assert!(Cli::try_parse_from(["todo", "bulk-complete"]).is_err());
    }

    #[test]
    fn test_rm_asks_unless_yes_is_given() {
        let id = Uuid::new_v4();
        let raw = id.to_string();

        let cli = Cli::try_parse_from(["todo", "rm", raw.as_str()]).unwrap();
        assert!(matches!(cli.command, Command::Rm { id: parsed, yes: false } if parsed == id));

        let cli = Cli::try_parse_from(["todo", "rm", "-y", raw.as_str()]).unwrap();
        assert!(matches!(cli.command, Command::Rm { yes: true, .. }));
    }

    #[test]
    fn test_value_enums_use_kebab_case() {
        let cli = Cli::try_parse_from(["todo", "sort", "created-at"]).unwrap();
        assert!(matches!(cli.command, Command::Sort { key: SortKey::CreatedAt, order: None }));
    }
}
