//! Snippet repository contract and shared error type.
//!
//! # Responsibility
//! - Define the CRUD-plus-search contract every backend implements.
//! - Define one error taxonomy so callers can swap backends freely.
//!
//! # Invariants
//! - Both backends return the same `RepoError` variant for the same condition.
//! - Ordered reads (`list`, `list_favorites`, `search`) are by id ascending.
//! - Returned snippets are copies; later mutations never reach them.

use crate::db::DbError;
use crate::model::snippet::{Language, Snippet, SnippetId, SnippetValidationError};
use crate::model::tag::Tag;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the in-memory and SQLite backends.
#[derive(Debug)]
pub enum RepoError {
    Validation(SnippetValidationError),
    NotFound(SnippetId),
    /// `add` was handed a snippet whose preset id is already stored.
    DuplicateId(SnippetId),
    /// `update` was handed a snippet that was never added.
    Unsaved,
    /// Every positive snippet id up to `i64::MAX` has been handed out.
    IdsExhausted,
    Db(DbError),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "snippet not found: {id}"),
            Self::DuplicateId(id) => write!(f, "snippet id already exists: {id}"),
            Self::Unsaved => write!(f, "snippet has no id; add it before updating"),
            Self::IdsExhausted => write!(f, "no snippet ids left to assign"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snippet data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SnippetValidationError> for RepoError {
    fn from(value: SnippetValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for snippets and their tags.
pub trait SnippetRepository {
    /// Persists `snippet` with its tags and writes the assigned id and the
    /// stored tag set back into it.
    ///
    /// A preset id is kept as-is and fails with `DuplicateId` when taken.
    /// Assigning past `i64::MAX` fails with `IdsExhausted`.
    fn add(&mut self, snippet: &mut Snippet) -> RepoResult<SnippetId>;

    /// Returns `Ok(None)` when no snippet has this id.
    fn get(&self, id: SnippetId) -> RepoResult<Option<Snippet>>;

    fn list(&self) -> RepoResult<Vec<Snippet>>;

    /// Removes the snippet and its tag links. Tags themselves are kept.
    fn delete(&mut self, id: SnippetId) -> RepoResult<()>;

    /// Case-insensitive substring match on title, optionally restricted to
    /// one language. Case folding is ASCII-only on every backend.
    fn search(&self, query: &str, language: Option<Language>) -> RepoResult<Vec<Snippet>>;

    /// Marks a snippet favorite and returns the updated record.
    fn favorite_on(&mut self, id: SnippetId) -> RepoResult<Snippet>;

    /// Clears the favorite flag and returns the updated record.
    fn favorite_off(&mut self, id: SnippetId) -> RepoResult<Snippet>;

    fn list_favorites(&self) -> RepoResult<Vec<Snippet>>;

    /// Persists field edits and replaces the whole tag set.
    fn update(&mut self, snippet: &mut Snippet) -> RepoResult<()>;

    /// Every tag known to the store, ordered by name ignoring ASCII case.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
}
