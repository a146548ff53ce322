//! Core storage logic for Snipster.
//! This crate owns the snippet/tag invariants shared by every front end.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::snippet::{Language, Snippet, SnippetFields, SnippetId, SnippetValidationError};
pub use model::tag::{normalize_tag, normalize_tags, tag_key, Tag, TagId};
pub use repo::memory_repo::InMemorySnippetRepository;
pub use repo::snippet_repo::{RepoError, RepoResult, SnippetRepository};
pub use repo::sqlite_repo::SqliteSnippetRepository;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
