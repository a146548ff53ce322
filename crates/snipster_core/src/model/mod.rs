//! Domain model for snippets and their tags.
//!
//! # Responsibility
//! - Define the records every repository backend stores and returns.
//! - Own validation and tag-name normalization rules.
//!
//! # Invariants
//! - Identifiers are assigned by repositories, never by the model.
//! - Snippet/tag association is many-to-many and has no attributes.

pub mod snippet;
pub mod tag;
