//! Civics CLI: inspect and change the persisted reading state

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use civics::catalog::Catalog;
use civics::data::types::now_millis;
use civics::data::{FileStore, HistoryEntry, TextSize, Theme};
use civics::Library;

/// Environment variable holding the log filter
const LOG_ENV: &str = "CIVICS_LOG";

#[derive(Parser)]
#[command(name = "civics", about = "Civic reader state: preferences, favorites, history", version)]
struct Cli {
    /// Directory holding the stored values (defaults to the user data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or change the theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Show or change the text size
    TextSize {
        #[command(subcommand)]
        action: Option<TextSizeAction>,
    },
    /// Manage favorites
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
    /// Open an item: records the visit and prints its route
    Open { id: String },
    /// Show or edit the reading history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Print an item's location and route without recording a visit
    Lookup { id: String },
    /// List the content catalog
    Catalog,
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    /// light, dark or system
    Set { theme: Theme },
    Toggle,
}

#[derive(Subcommand)]
enum TextSizeAction {
    Show,
    /// small, default, large or extra-large
    Set { size: TextSize },
}

#[derive(Subcommand)]
enum FavAction {
    Add { id: String },
    Remove { id: String },
    Toggle { id: String },
    List,
    Clear,
}

#[derive(Subcommand)]
enum HistoryAction {
    List,
    Remove { id: String },
    Clear,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let store = match cli.data_dir {
        Some(dir) => FileStore::with_dir(dir),
        None => FileStore::open_default()?,
    };
    tracing::debug!(dir = ?store.dir(), "opening store");
    let catalog = Catalog::bundled().context("bundled catalog is invalid")?;
    let mut library = Library::open(Arc::new(store), catalog)?;

    match cli.command {
        Command::Theme { action } => match action.unwrap_or(ThemeAction::Show) {
            ThemeAction::Show => println!("{}", library.theme()),
            ThemeAction::Set { theme } => {
                library.set_theme(theme)?;
                println!("{}", theme);
            }
            ThemeAction::Toggle => println!("{}", library.toggle_theme()?),
        },

        Command::TextSize { action } => match action.unwrap_or(TextSizeAction::Show) {
            TextSizeAction::Show => print_text_size(library.text_size()),
            TextSizeAction::Set { size } => {
                library.set_text_size(size)?;
                print_text_size(size);
            }
        },

        Command::Fav { action } => match action {
            FavAction::Add { id } => {
                require_item(&library, &id)?;
                if !library.favorites_mut().add(&id)? {
                    println!("{} is already a favorite", id);
                }
            }
            FavAction::Remove { id } => {
                if !library.favorites_mut().remove(&id)? {
                    println!("{} is not a favorite", id);
                }
            }
            FavAction::Toggle { id } => {
                require_item(&library, &id)?;
                let on = library.favorites_mut().toggle(&id)?;
                println!("{} {}", id, if on { "added" } else { "removed" });
            }
            FavAction::List => {
                for id in library.favorites().ids() {
                    match library.catalog().find(id) {
                        Some(found) => println!("{:<24} {}", id, found.title()),
                        None => println!("{:<24} (not in catalog)", id),
                    }
                }
            }
            FavAction::Clear => library.favorites_mut().clear_all()?,
        },

        Command::Open { id } => println!("{}", library.open_item(&id)?),

        Command::History { action } => match action.unwrap_or(HistoryAction::List) {
            HistoryAction::List => {
                let now = now_millis();
                for entry in library.history().recent() {
                    print_entry(entry, now);
                }
            }
            HistoryAction::Remove { id } => {
                if !library.history_mut().remove_entry(&id)? {
                    println!("{} is not in the history", id);
                }
            }
            HistoryAction::Clear => library.history_mut().clear_all()?,
        },

        Command::Lookup { id } => {
            let found = require_item(&library, &id)?;
            println!("{} / {} / {}", found.topic_title(), found.section_title(), found.title());
            println!("{}", civics::catalog::Route::for_item(&id));
        }

        Command::Catalog => {
            for topic in library.catalog().topics() {
                println!("{}", topic.title);
                for section in &topic.sections {
                    println!("  {}", section.title);
                    for item in &section.items {
                        println!("    {:<24} {}", item.id, item.title);
                    }
                }
            }
        }
    }

    library.flush();
    let failures = library.failures();
    if !failures.is_empty() {
        eprintln!("warning: {} change(s) kept in memory only, not saved", failures.len());
    }
    Ok(())
}

fn require_item<'a>(
    library: &'a Library,
    id: &str,
) -> anyhow::Result<civics::catalog::ItemRef<'a>> {
    match library.catalog().find(id) {
        Some(found) => Ok(found),
        None => bail!("no content item with id '{}'", id),
    }
}

fn print_text_size(size: TextSize) {
    println!("{} ({}, x{})", size, size.label(), size.multiplier());
}

fn print_entry(entry: &HistoryEntry, now: u64) {
    println!(
        "{:<24} {:<40} {:<28} {}",
        entry.id,
        entry.title,
        entry.section,
        format_age(now.saturating_sub(entry.timestamp))
    );
}

fn format_age(ms: u64) -> String {
    let secs = ms / 1000;
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{} min ago", secs / 60),
        3600..=86_399 => format!("{} h ago", secs / 3600),
        _ => format!("{} d ago", secs / 86_400),
    }
}
