//! Line-oriented to-do list.
//!
//! Reads commands from stdin, one per line, and prints the announcement and
//! the visible list after each change. The list is kept in
//! `<data dir>/<key>.json` and reloaded on the next start.
//!
//! ```text
//! $ todo --seed-demo
//! > add buy bread
//! "buy bread" was added
//! > filter active
//! > move 3 1
//! ```

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reducible_core::storage::Storage;
use reducible_runtime::MemoryStorage;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use todo::config::{DATA_DIR_VAR, STORAGE_KEY_VAR};
use todo::{AppConfig, Filter, Session, TodoAction, TodoEnvironment, TodoStore, demo_list, open_store};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "A persistent to-do list driven from the terminal")]
struct Cli {
    /// Directory holding the list (overrides TODO_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Storage slot name (overrides TODO_STORAGE_KEY)
    #[arg(long)]
    key: Option<String>,

    /// Start from a sample list when nothing is stored yet
    #[arg(long)]
    seed_demo: bool,

    /// Keep the list in memory only
    #[arg(long)]
    in_memory: bool,
}

/// One line of input
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// Item numbers refer to the visible list, starting at 1
#[derive(Subcommand, Debug)]
enum Command {
    /// Add an item
    Add {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Mark an item completed, or active again
    Toggle { item: usize },
    /// Remove an item
    Clear { item: usize },
    /// Remove every completed item
    ClearCompleted,
    /// Rename an item
    Edit {
        item: usize,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    /// Move an item to another place in the visible list
    Move { from: usize, to: usize },
    /// Show all, active or completed items
    Filter { filter: Filter },
    /// Print the visible list
    List,
    /// Save and exit
    #[command(alias = "exit")]
    Quit,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::from_lookup(|name| {
        let flag = match name {
            DATA_DIR_VAR => cli
                .data_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            STORAGE_KEY_VAR => cli.key.clone(),
            _ => None,
        };
        flag.or_else(|| std::env::var(name).ok())
    })
    .context("invalid configuration")?;

    let environment = TodoEnvironment::production();
    let seed = if cli.seed_demo {
        Session::with_list(demo_list(&environment))
    } else {
        Session::new()
    };

    let storage: Arc<dyn Storage> = if cli.in_memory {
        Arc::new(MemoryStorage::new())
    } else {
        println!("Using {}", config.slot_file().display());
        Arc::new(config.file_storage())
    };

    let store = open_store(seed, environment, storage, &config);
    run(&store, std::io::stdin().lock())?;

    store.persist_now().context("failed to save the list")?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(store: &TodoStore, input: impl BufRead) -> Result<()> {
    let mut updates = store.subscribe();
    render(&store.snapshot());
    prompt()?;

    for line in input.lines() {
        let line = line.context("failed to read input")?;
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            prompt()?;
            continue;
        }

        match Line::try_parse_from(words) {
            Ok(Line {
                command: Command::Quit,
            }) => return Ok(()),
            Ok(Line {
                command: Command::List,
            }) => render(&store.snapshot()),
            Ok(Line { command }) => match to_action(&store.snapshot(), command) {
                Ok(action) => {
                    store.dispatch(action);
                    show_updates(&mut updates);
                },
                Err(error) => println!("{error}"),
            },
            Err(error) => print!("{error}"),
        }
        prompt()?;
    }

    Ok(())
}

/// Turn a parsed line into an action against the current session
fn to_action(session: &Session, command: Command) -> Result<TodoAction> {
    let action = match command {
        Command::Add { text } => TodoAction::Add {
            text: text.join(" "),
        },
        Command::Toggle { item } => TodoAction::Toggle {
            id: visible_id(session, item)?,
        },
        Command::Clear { item } => TodoAction::Clear {
            id: visible_id(session, item)?,
        },
        Command::ClearCompleted => TodoAction::ClearAllCompleted,
        Command::Edit { item, text } => TodoAction::Edit {
            id: visible_id(session, item)?,
            text: text.join(" "),
        },
        Command::Move { from, to } => TodoAction::Move {
            from: index(from)?,
            to: index(to)?,
        },
        Command::Filter { filter } => TodoAction::SetFilter(filter),
        Command::List | Command::Quit => bail!("not an action"),
    };
    Ok(action)
}

fn index(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .context("item numbers start at 1")
}

fn visible_id(session: &Session, number: usize) -> Result<todo::TodoId> {
    let item = session
        .visible_item(index(number)?)
        .with_context(|| format!("no item {number} in the {} list", session.filter()))?;
    Ok(item.id)
}

/// Print the newest snapshot published since the last call
fn show_updates(updates: &mut broadcast::Receiver<Arc<Session>>) {
    let mut latest = None;
    loop {
        match updates.try_recv() {
            Ok(snapshot) => latest = Some(snapshot),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Skipped stale snapshots");
            },
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    if let Some(session) = latest {
        if let Some(announcement) = session.announcement() {
            println!("{announcement}");
        }
        render(&session);
    }
}

fn render(session: &Session) {
    println!("-- {} | {} --", session.filter().label(), session.items_left());
    for (number, item) in session.visible().enumerate() {
        let mark = if item.completed { 'x' } else { ' ' };
        println!("{:>3}. [{mark}] {}", number + 1, item.text);
    }
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush().context("failed to write prompt")
}
