//! # zipscope CLI Entry Point
//!
//! Terminal viewers for zip archives, JSON documents and conversation
//! exports.
//!
//! ## Usage
//!
//! ```bash
//! # Entry names of an archive
//! zipscope list export.zip
//!
//! # Archive path from stdin
//! echo '{"zip_path": "export.zip"}' | zipscope browse
//!
//! # Entry metadata as JSON
//! zipscope meta export.zip
//!
//! # JSON tree over a file or stdin
//! zipscope tree data.json
//! curl -s https://example.org/data.json | zipscope tree -
//!
//! # Conversations of an export archive
//! zipscope gpt export.zip
//!
//! # Pick one string from a JSON array
//! echo '["a", "b"]' | zipscope pick
//!
//! # Reduce one conversation to its main-path messages
//! zipscope reduce conversations.json 0
//! ```
//!
//! ## Errors
//!
//! Failures before the interface is up print one JSON object on stderr
//! (`{"type", "message", "hint"}`) and exit with status 1. Ctrl-C exits with
//! status 130.
//!
//! ## Key Bindings
//!
//! Every list-like view shares:
//! - `j` / `k` / arrows - move
//! - `u` / `d` / `PgUp` / `PgDn` / `Ctrl+u` / `Ctrl+d` - page
//! - `g` / `G` / `Home` / `End` - top / bottom
//! - `/` - search, `Enter` accept, `Esc` cancel
//! - `n` / `N` - next / previous match
//! - `q` - quit or go back

use zipscope::commands::{self, AppContext};
use zipscope::config::Config;
use zipscope::error::{emit_error, ErrorReport};
use zipscope::logging;
use zipscope::ui::terminal::{install_panic_hook, spawn_signal_listener};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// zipscope - inspect archives and JSON in the terminal
#[derive(Parser, Debug)]
#[command(name = "zipscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal viewers for zip archives, JSON and conversation exports", long_about = None)]
struct Cli {
    /// Configuration file to use instead of the platform default
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Browse the entry names of a zip archive
    List {
        /// Archive path (else `{"zip_path": ...}` on stdin)
        zip: Option<PathBuf>,
    },
    /// Print the metadata of every entry as a JSON array
    Meta {
        /// Archive path (else `{"zip_path": ...}` on stdin)
        zip: Option<PathBuf>,
    },
    /// Browse entries with metadata, JSON previews and external opening
    Browse {
        /// Archive path (else `{"zip_path": ...}` on stdin)
        zip: Option<PathBuf>,
    },
    /// Explore a JSON document as a collapsible tree
    Tree {
        /// JSON file, or `-` / nothing for stdin
        file: Option<PathBuf>,
    },
    /// Read the conversations of a chat export archive
    Gpt {
        /// Archive path (else `{"zip_path": ...}` on stdin)
        zip: Option<PathBuf>,
    },
    /// Choose one string from a JSON array on stdin and print it
    Pick,
    /// Print the main-path messages of a conversation as JSON
    Reduce {
        /// Conversation list, single conversation or bare mapping
        file: PathBuf,
        /// Conversation index for a list, leaf node id for a bare mapping
        selector: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // The TUI owns the terminal, so logging is file-only. A log file that
    // cannot be opened is reported once, before any screen takes over.
    if let Err(e) = logging::init_logging() {
        eprintln!("zipscope: file logging disabled: {e:#}");
    }
    install_panic_hook();
    let _signals = spawn_signal_listener();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            emit_error(&ErrorReport::from_error(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config, cli.config);
    tracing::debug!(command = ?cli.command, "starting");

    match cli.command {
        Command::List { zip } => commands::list(&ctx, zip).await,
        Command::Meta { zip } => {
            let mut out = io::stdout().lock();
            commands::meta(zip, &mut out)?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Browse { zip } => commands::browse(&ctx, zip).await,
        Command::Tree { file } => commands::tree(&ctx, file).await,
        Command::Gpt { zip } => commands::gpt(&ctx, zip).await,
        Command::Pick => commands::pick(&ctx).await,
        Command::Reduce { file, selector } => {
            let mut out = io::stdout().lock();
            commands::reduce(&file, selector.as_deref(), &mut out)?;
            out.flush()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
