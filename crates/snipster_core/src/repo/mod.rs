//! Repository layer: one snippet contract, two backends.
//!
//! # Responsibility
//! - Define the storage contract consumed by UI and CLI callers.
//! - Provide in-memory and SQLite implementations with identical semantics.
//!
//! # Invariants
//! - Repository writes call `Snippet::validate()` before persistence.
//! - Missing ids surface as `RepoError::NotFound` from mutating operations
//!   and as `None` from `get`.

pub mod memory_repo;
pub mod snippet_repo;
pub mod sqlite_repo;
