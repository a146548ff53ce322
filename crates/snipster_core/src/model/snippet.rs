//! Snippet domain model.
//!
//! # Responsibility
//! - Define the canonical snippet record shared by every repository backend.
//! - Enforce required fields and the closed language set at construction.
//!
//! # Invariants
//! - `title` is never blank and `code` never empty for a validated snippet.
//! - `language` is always one of the closed [`Language`] values.
//! - `id` is `None` until a repository assigns one in `add`.

use crate::model::tag::{normalize_tag, Tag};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned snippet identifier.
pub type SnippetId = i64;

/// Programming language annotation for a snippet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Rust,
    Golang,
    Javascript,
    Powershell,
    Bash,
    Sql,
    Other,
    /// Sentinel used when the caller did not pick a language.
    #[default]
    Unspecified,
}

impl Language {
    /// Every accepted value, in display order.
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::Rust,
        Language::Golang,
        Language::Javascript,
        Language::Powershell,
        Language::Bash,
        Language::Sql,
        Language::Other,
        Language::Unspecified,
    ];

    /// Stable lowercase name used for storage and display.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Golang => "golang",
            Language::Javascript => "javascript",
            Language::Powershell => "powershell",
            Language::Bash => "bash",
            Language::Sql => "sql",
            Language::Other => "other",
            Language::Unspecified => "unspecified",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SnippetValidationError;

    /// Parses a language name, ignoring surrounding whitespace and ASCII case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == normalized)
            .ok_or_else(|| SnippetValidationError::UnknownLanguage(value.to_string()))
    }
}

/// Construction-time validation failures for [`Snippet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetValidationError {
    MissingTitle,
    MissingCode,
    UnknownLanguage(String),
    /// A tag name is empty after normalization.
    BlankTag,
}

impl Display for SnippetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "snippet title is required"),
            Self::MissingCode => write!(f, "snippet code is required"),
            Self::UnknownLanguage(value) => write!(
                f,
                "unknown language `{value}`; expected one of python|rust|golang|javascript|powershell|bash|sql|other"
            ),
            Self::BlankTag => write!(f, "tag names cannot be blank"),
        }
    }
}

impl Error for SnippetValidationError {}

/// Canonical snippet record.
///
/// Equality compares the identifier and scalar fields only; tag sets are
/// compared separately by callers that care about them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SnippetFields")]
pub struct Snippet {
    pub id: Option<SnippetId>,
    pub title: String,
    /// Stored verbatim, including newlines and quotes.
    pub code: String,
    pub description: Option<String>,
    pub language: Language,
    pub favorite: bool,
    pub tags: Vec<Tag>,
}

impl PartialEq for Snippet {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.code == other.code
            && self.description == other.description
            && self.language == other.language
            && self.favorite == other.favorite
    }
}

impl Eq for Snippet {}

impl Snippet {
    /// Creates an unsaved snippet with default optional fields.
    ///
    /// # Errors
    /// - `MissingTitle` when the title is blank.
    /// - `MissingCode` when the code is empty. Whitespace-only code is kept.
    pub fn new(
        title: impl Into<String>,
        code: impl Into<String>,
    ) -> Result<Self, SnippetValidationError> {
        let snippet = Self {
            id: None,
            title: title.into(),
            code: code.into(),
            description: None,
            language: Language::default(),
            favorite: false,
            tags: Vec::new(),
        };
        snippet.validate()?;
        Ok(snippet)
    }

    /// Builds a snippet from a named-field mapping.
    ///
    /// Applies the same defaults as [`Snippet::new`]: `favorite = false` and
    /// `language = unspecified` when absent.
    pub fn create(fields: SnippetFields) -> Result<Self, SnippetValidationError> {
        let language = match fields.language.as_deref() {
            Some(value) => value.parse()?,
            None => Language::default(),
        };

        let snippet = Self {
            id: fields.id,
            title: fields.title.unwrap_or_default(),
            code: fields.code.unwrap_or_default(),
            description: fields.description,
            language,
            favorite: fields.favorite.unwrap_or(false),
            tags: fields.tags,
        };
        snippet.validate()?;
        Ok(snippet)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Attaches tags by name. Names are normalized when the snippet is saved.
    pub fn with_tags<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = names.into_iter().map(Tag::new).collect();
        self
    }

    /// Checks required fields and tag names.
    ///
    /// Repositories call this before every write, so snippets assembled with
    /// a struct literal are held to the same rules as constructed ones.
    pub fn validate(&self) -> Result<(), SnippetValidationError> {
        if self.title.trim().is_empty() {
            return Err(SnippetValidationError::MissingTitle);
        }
        if self.code.is_empty() {
            return Err(SnippetValidationError::MissingCode);
        }
        if self.tags.iter().any(|tag| normalize_tag(&tag.name).is_none()) {
            return Err(SnippetValidationError::BlankTag);
        }
        Ok(())
    }

    /// Tag names in stored order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.name.as_str()).collect()
    }
}

/// Named-field input for [`Snippet::create`].
///
/// Every field is optional so that missing required values surface as
/// validation errors rather than decoding errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SnippetFields {
    pub id: Option<SnippetId>,
    pub title: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub favorite: Option<bool>,
    pub tags: Vec<Tag>,
}

impl TryFrom<SnippetFields> for Snippet {
    type Error = SnippetValidationError;

    fn try_from(value: SnippetFields) -> Result<Self, Self::Error> {
        Snippet::create(value)
    }
}
