//! In-memory snippet repository.
//!
//! # Responsibility
//! - Provide an ephemeral backend with the exact semantics of the SQLite one.
//! - Serve as the reference backend for contract tests.
//!
//! # Invariants
//! - Ids come from a high-water mark and are never handed out twice, even
//!   after the highest-numbered snippet is deleted.
//! - Tag names map to one tag id for the lifetime of the repository; case
//!   variants share it and keep the spelling first stored.

use crate::model::snippet::{Language, Snippet, SnippetId};
use crate::model::tag::{normalize_tags, tag_key, Tag, TagId};
use crate::repo::snippet_repo::{RepoError, RepoResult, SnippetRepository};
use log::debug;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Ordered-map backed snippet store.
#[derive(Debug, Default)]
pub struct InMemorySnippetRepository {
    snippets: BTreeMap<SnippetId, Snippet>,
    /// Stored tags keyed by [`tag_key`].
    tags: BTreeMap<String, Tag>,
    last_snippet_id: SnippetId,
    last_tag_id: TagId,
}

impl InMemorySnippetRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_snippet_id(&mut self) -> RepoResult<SnippetId> {
        let Some(id) = self.last_snippet_id.checked_add(1) else {
            debug!("event=snippet_add module=repo backend=memory status=ids_exhausted");
            return Err(RepoError::IdsExhausted);
        };
        self.last_snippet_id = id;
        Ok(id)
    }

    /// Normalizes tag names and resolves each to its stored tag, creating
    /// the ones not seen before.
    fn resolve_tags(&mut self, tags: &[Tag]) -> Vec<Tag> {
        let names = normalize_tags(tags.iter().map(|tag| tag.name.as_str()));
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let tag = match self.tags.entry(tag_key(&name)) {
                Entry::Occupied(stored) => stored.get().clone(),
                Entry::Vacant(slot) => {
                    self.last_tag_id += 1;
                    slot.insert(Tag {
                        id: Some(self.last_tag_id),
                        name,
                    })
                    .clone()
                }
            };
            resolved.push(tag);
        }
        resolved
    }

    fn set_favorite(&mut self, id: SnippetId, favorite: bool) -> RepoResult<Snippet> {
        let Some(stored) = self.snippets.get_mut(&id) else {
            debug!("event=snippet_favorite module=repo backend=memory status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        };
        stored.favorite = favorite;
        debug!("event=snippet_favorite module=repo backend=memory status=ok snippet_id={id} favorite={favorite}");
        Ok(stored.clone())
    }

    fn collect_where(&self, predicate: impl Fn(&Snippet) -> bool) -> Vec<Snippet> {
        self.snippets
            .values()
            .filter(|snippet| predicate(snippet))
            .cloned()
            .collect()
    }
}

impl SnippetRepository for InMemorySnippetRepository {
    fn add(&mut self, snippet: &mut Snippet) -> RepoResult<SnippetId> {
        snippet.validate()?;

        let id = match snippet.id {
            Some(id) if self.snippets.contains_key(&id) => {
                return Err(RepoError::DuplicateId(id));
            }
            Some(id) => {
                self.last_snippet_id = self.last_snippet_id.max(id);
                id
            }
            None => self.next_snippet_id()?,
        };

        let tags = self.resolve_tags(&snippet.tags);
        snippet.id = Some(id);
        snippet.tags = tags;
        self.snippets.insert(id, snippet.clone());

        debug!(
            "event=snippet_add module=repo backend=memory status=ok snippet_id={id} tag_count={}",
            snippet.tags.len()
        );
        Ok(id)
    }

    fn get(&self, id: SnippetId) -> RepoResult<Option<Snippet>> {
        Ok(self.snippets.get(&id).cloned())
    }

    fn list(&self) -> RepoResult<Vec<Snippet>> {
        Ok(self.snippets.values().cloned().collect())
    }

    fn delete(&mut self, id: SnippetId) -> RepoResult<()> {
        if self.snippets.remove(&id).is_none() {
            debug!("event=snippet_delete module=repo backend=memory status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        }
        debug!("event=snippet_delete module=repo backend=memory status=ok snippet_id={id}");
        Ok(())
    }

    fn search(&self, query: &str, language: Option<Language>) -> RepoResult<Vec<Snippet>> {
        let needle = query.to_ascii_lowercase();
        Ok(self.collect_where(|snippet| {
            snippet.title.to_ascii_lowercase().contains(&needle)
                && (language.is_none() || language == Some(snippet.language))
        }))
    }

    fn favorite_on(&mut self, id: SnippetId) -> RepoResult<Snippet> {
        self.set_favorite(id, true)
    }

    fn favorite_off(&mut self, id: SnippetId) -> RepoResult<Snippet> {
        self.set_favorite(id, false)
    }

    fn list_favorites(&self) -> RepoResult<Vec<Snippet>> {
        Ok(self.collect_where(|snippet| snippet.favorite))
    }

    fn update(&mut self, snippet: &mut Snippet) -> RepoResult<()> {
        snippet.validate()?;
        let id = snippet.id.ok_or(RepoError::Unsaved)?;
        if !self.snippets.contains_key(&id) {
            debug!("event=snippet_update module=repo backend=memory status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        }

        snippet.tags = self.resolve_tags(&snippet.tags);
        self.snippets.insert(id, snippet.clone());
        debug!(
            "event=snippet_update module=repo backend=memory status=ok snippet_id={id} tag_count={}",
            snippet.tags.len()
        );
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        Ok(self.tags.values().cloned().collect())
    }
}
