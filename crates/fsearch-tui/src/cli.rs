//! CLI argument parsing for fsearch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fsearch")]
#[command(about = "Floating search over a directory of markdown notes", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory of notes to search
    #[arg(short, long, default_value = ".")]
    pub vault: PathBuf,

    /// Config directory override (defaults to the XDG config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (logs to /tmp/fsearch.log)
    #[arg(short, long)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive TUI mode (default)
    Tui,

    /// One-shot search query, printed to stdout
    Query {
        /// Search query
        query: String,
    },

    /// Handle an fsearch:// URI
    Uri {
        /// The URI, e.g. fsearch://open?viewtype=tab&query=bar
        uri: String,
    },
}
