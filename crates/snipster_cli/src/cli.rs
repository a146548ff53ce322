//! Command-line surface for the snipster binary.

use clap::{Parser, Subcommand};
use snipster_core::{Language, SnippetId};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "snipster", version, about = "Personal code-snippet manager")]
pub struct Cli {
    /// Use a throwaway in-memory store instead of the database.
    #[arg(long, global = true)]
    pub memory: bool,

    /// SQLite url, e.g. `sqlite:///home/me/.snipster/snipster.sqlite`.
    /// Overrides DATABASE_URL.
    #[arg(long, global = true, value_name = "URL")]
    pub database: Option<String>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a new snippet.
    Add {
        #[arg(long, short)]
        title: String,
        /// Snippet body. Use `--file` for multi-line code.
        #[arg(long, short, conflicts_with = "file", required_unless_present = "file")]
        code: Option<String>,
        /// Read the snippet body from a file.
        #[arg(long, short)]
        file: Option<PathBuf>,
        #[arg(long, short)]
        description: Option<String>,
        /// python|rust|golang|javascript|powershell|bash|sql|other
        #[arg(long, short)]
        language: Option<Language>,
        /// Tag name; repeat for several tags.
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        #[arg(long)]
        favorite: bool,
    },
    /// Show one snippet including its code.
    Get { id: SnippetId },
    /// List stored snippets.
    List {
        /// Only favorites.
        #[arg(long)]
        favorites: bool,
    },
    /// Delete a snippet. Its tags stay available.
    Delete { id: SnippetId },
    /// Find snippets whose title contains QUERY (case-insensitive).
    Search {
        query: String,
        #[arg(long, short)]
        language: Option<Language>,
    },
    /// Mark a snippet as favorite.
    Fav { id: SnippetId },
    /// Remove the favorite mark.
    Unfav { id: SnippetId },
    /// List every known tag.
    Tags,
}

impl Command {
    /// Stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Get { .. } => "get",
            Self::List { .. } => "list",
            Self::Delete { .. } => "delete",
            Self::Search { .. } => "search",
            Self::Fav { .. } => "fav",
            Self::Unfav { .. } => "unfav",
            Self::Tags => "tags",
        }
    }
}
