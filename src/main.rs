//! `library` command-line front end.
//!
//! Each invocation loads the data file, runs one operation and saves the
//! file again if the operation changed anything.

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use library_ledger::{FixedClock, LibraryConfig, LibraryDisplay, LibrarySystem, SearchField};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the library desk
#[derive(Parser, Debug)]
#[command(name = "library", version, about = "Library catalog and lending desk")]
struct Cli {
    /// Library data file (JSON snapshot); created on first write
    #[arg(long, global = true, env = "LIBRARY_DATA")]
    data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Output machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Operation to run
    #[command(subcommand)]
    command: Command,
}

/// Desk operations
#[derive(Subcommand, Debug)]
enum Command {
    /// Add a book to the catalog
    Add {
        /// Unique isbn
        isbn: String,
        /// Book title
        title: String,
        /// Book author
        #[arg(long)]
        author: Option<String>,
        /// Number of copies
        #[arg(long, default_value_t = 1)]
        copies: u32,
    },
    /// List every book by title
    Catalog,
    /// Search the catalog
    Search {
        /// Text to look for
        query: String,
        /// Field to search: title, author or isbn
        #[arg(long, default_value = "title")]
        by: SearchField,
    },
    /// Lend a book to a patron
    Borrow {
        /// Six-digit library card number
        patron_id: String,
        /// Isbn of the book
        isbn: String,
    },
    /// Take a book back from a patron
    Return {
        /// Six-digit library card number
        patron_id: String,
        /// Isbn of the book
        isbn: String,
    },
    /// Show the late fee on a patron's loan of a book
    Fee {
        /// Six-digit library card number
        patron_id: String,
        /// Isbn of the book
        isbn: String,
    },
    /// Show a patron's loans and fees
    Status {
        /// Six-digit library card number
        patron_id: String,
    },
    /// Show recent library activity
    Activity,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    run(cli)
}

/// Load the library, dispatch the command and persist any change
fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => LibraryConfig::from_file(path)?,
        None => LibraryConfig::default(),
    };
    let data_file = cli.data.unwrap_or(config.data_file);

    let mut system = if data_file.exists() {
        LibrarySystem::load_state_from_file(&data_file, config.policy)
            .with_context(|| format!("Failed to load {}", data_file.display()))?
    } else {
        LibrarySystem::new(config.policy)
    }
    .with_standard_observers();
    if let Some(date) = cli.today {
        system = system.with_clock(Box::new(FixedClock::new(date)));
    }

    let json = cli.json;
    let changed = match cli.command {
        Command::Add { isbn, title, author, copies } => {
            let book = system.add_book_with_author(&isbn, &title, author.as_deref(), copies)?;
            if json {
                print_json(&book)?;
            } else {
                let line =
                    format!("Book \"{}\" has been successfully added to the catalog.", book.title());
                println!("{}", line.as_str().green());
            }
            true
        }
        Command::Catalog => {
            let books = system.list_books();
            if json {
                print_json(&books)?;
            } else {
                println!("{}", LibraryDisplay::catalog_table(&books));
            }
            false
        }
        Command::Search { query, by } => {
            let books = system.search(by, &query);
            if json {
                print_json(&books)?;
            } else {
                println!("{}", LibraryDisplay::catalog_table(&books));
            }
            false
        }
        Command::Borrow { patron_id, isbn } => {
            let loan = system.borrow(&patron_id, &isbn)?;
            if json {
                print_json(&loan)?;
            } else {
                let title = system.catalog().get(&loan.isbn).map(|b| b.title().to_string());
                let line = LibraryDisplay::loan_line(&loan, &title.unwrap_or_default());
                println!("{}", line.as_str().green());
            }
            true
        }
        Command::Return { patron_id, isbn } => {
            let receipt = system.return_book(&patron_id, &isbn)?;
            if json {
                print_json(&receipt)?;
            } else {
                let line = LibraryDisplay::receipt_line(&receipt);
                if receipt.days_overdue > 0 {
                    println!("{}", line.as_str().yellow());
                } else {
                    println!("{}", line.as_str().green());
                }
            }
            true
        }
        Command::Fee { patron_id, isbn } => {
            let quote = system.late_fee_quote(&patron_id, &isbn)?;
            if json {
                print_json(&quote)?;
            } else {
                println!("{}", LibraryDisplay::fee_line(&quote));
            }
            false
        }
        Command::Status { patron_id } => {
            let status = system.patron_status(&patron_id)?;
            if json {
                print_json(&status)?;
            } else {
                print!("{}", LibraryDisplay::status_report(&status));
            }
            false
        }
        Command::Activity => {
            if json {
                print_json(&system.journal())?;
            } else {
                println!("{}", LibraryDisplay::journal_table(system.journal()));
            }
            false
        }
    };

    if changed {
        system
            .save_state_to_file(&data_file)
            .with_context(|| format!("Failed to save {}", data_file.display()))?;
    }
    Ok(())
}

/// Print a value as pretty JSON on stdout
fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
