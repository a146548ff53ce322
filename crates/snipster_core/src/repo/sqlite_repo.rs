//! SQLite-backed snippet repository.
//!
//! # Responsibility
//! - Implement the snippet contract with set-based queries over
//!   `snippets`, `tags` and `snippet_tags`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Multi-statement writes run in one immediate transaction.
//! - Tag rows are matched by name under `NOCASE` and reused with their first
//!   stored spelling; deletes only drop link rows.
//! - `AUTOINCREMENT` keeps ids from being recycled after deletes.
//! - The repository borrows a ready connection and never opens or closes one.

use crate::db::schema::{table_exists, REQUIRED_TABLES};
use crate::model::snippet::{Language, Snippet, SnippetId};
use crate::model::tag::{normalize_tags, Tag};
use crate::repo::snippet_repo::{RepoError, RepoResult, SnippetRepository};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const SNIPPET_SELECT_SQL: &str = "SELECT
    id,
    title,
    code,
    description,
    language,
    favorite
FROM snippets";

/// Snippet repository over a caller-owned SQLite connection.
pub struct SqliteSnippetRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSnippetRepository<'conn> {
    /// Wraps a connection that already carries the snippet schema.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when the schema has not been created, e.g.
    ///   for a connection not produced by [`crate::db::open_db`].
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        for table in REQUIRED_TABLES {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
        }
        Ok(Self { conn })
    }

    fn query_snippets(&self, filter: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Snippet>> {
        let sql = format!("{SNIPPET_SELECT_SQL} WHERE {filter} ORDER BY id ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut snippets = Vec::new();
        while let Some(row) = rows.next()? {
            let mut snippet = parse_snippet_row(row)?;
            if let Some(id) = snippet.id {
                snippet.tags = load_tags_for_snippet(self.conn, id)?;
            }
            snippets.push(snippet);
        }
        Ok(snippets)
    }

    fn set_favorite(&mut self, id: SnippetId, favorite: bool) -> RepoResult<Snippet> {
        let changed = self.conn.execute(
            "UPDATE snippets SET favorite = ?2 WHERE id = ?1;",
            params![id, favorite],
        )?;

        if changed == 0 {
            debug!("event=snippet_favorite module=repo backend=sqlite status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        }

        debug!("event=snippet_favorite module=repo backend=sqlite status=ok snippet_id={id} favorite={favorite}");
        self.get(id)?.ok_or(RepoError::NotFound(id))
    }
}

impl SnippetRepository for SqliteSnippetRepository<'_> {
    fn add(&mut self, snippet: &mut Snippet) -> RepoResult<SnippetId> {
        snippet.validate()?;
        let tag_names = normalize_tags(snippet.tags.iter().map(|tag| tag.name.as_str()));

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        match snippet.id {
            Some(id) if snippet_exists_in_tx(&tx, id)? => {
                return Err(RepoError::DuplicateId(id));
            }
            Some(_) => {}
            None if last_assigned_id_in_tx(&tx)? == SnippetId::MAX => {
                debug!("event=snippet_add module=repo backend=sqlite status=ids_exhausted");
                return Err(RepoError::IdsExhausted);
            }
            None => {}
        }

        tx.execute(
            "INSERT INTO snippets (
                id,
                title,
                code,
                description,
                language,
                favorite
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                snippet.id,
                snippet.title.as_str(),
                snippet.code.as_str(),
                snippet.description.as_deref(),
                snippet.language.as_str(),
                snippet.favorite,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let tags = link_tags_in_tx(&tx, id, &tag_names)?;
        tx.commit()?;

        snippet.id = Some(id);
        snippet.tags = tags;
        debug!(
            "event=snippet_add module=repo backend=sqlite status=ok snippet_id={id} tag_count={}",
            snippet.tags.len()
        );
        Ok(id)
    }

    fn get(&self, id: SnippetId) -> RepoResult<Option<Snippet>> {
        let mut found = self.query_snippets("id = ?", vec![Value::Integer(id)])?;
        Ok(found.pop())
    }

    fn list(&self) -> RepoResult<Vec<Snippet>> {
        self.query_snippets("1 = 1", Vec::new())
    }

    fn delete(&mut self, id: SnippetId) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM snippet_tags WHERE snippet_id = ?1;", [id])?;
        let changed = tx.execute("DELETE FROM snippets WHERE id = ?1;", [id])?;
        if changed == 0 {
            debug!("event=snippet_delete module=repo backend=sqlite status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        }
        tx.commit()?;

        debug!("event=snippet_delete module=repo backend=sqlite status=ok snippet_id={id}");
        Ok(())
    }

    fn search(&self, query: &str, language: Option<Language>) -> RepoResult<Vec<Snippet>> {
        // SQLite lower() folds ASCII only, matching the in-memory backend.
        let mut filter = String::from("instr(lower(title), lower(?)) > 0");
        let mut bind_values = vec![Value::Text(query.to_string())];

        if let Some(language) = language {
            filter.push_str(" AND language = ?");
            bind_values.push(Value::Text(language.as_str().to_string()));
        }

        self.query_snippets(&filter, bind_values)
    }

    fn favorite_on(&mut self, id: SnippetId) -> RepoResult<Snippet> {
        self.set_favorite(id, true)
    }

    fn favorite_off(&mut self, id: SnippetId) -> RepoResult<Snippet> {
        self.set_favorite(id, false)
    }

    fn list_favorites(&self) -> RepoResult<Vec<Snippet>> {
        self.query_snippets("favorite = 1", Vec::new())
    }

    fn update(&mut self, snippet: &mut Snippet) -> RepoResult<()> {
        snippet.validate()?;
        let id = snippet.id.ok_or(RepoError::Unsaved)?;
        let tag_names = normalize_tags(snippet.tags.iter().map(|tag| tag.name.as_str()));

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE snippets
             SET
                title = ?2,
                code = ?3,
                description = ?4,
                language = ?5,
                favorite = ?6
             WHERE id = ?1;",
            params![
                id,
                snippet.title.as_str(),
                snippet.code.as_str(),
                snippet.description.as_deref(),
                snippet.language.as_str(),
                snippet.favorite,
            ],
        )?;
        if changed == 0 {
            debug!("event=snippet_update module=repo backend=sqlite status=not_found snippet_id={id}");
            return Err(RepoError::NotFound(id));
        }

        tx.execute("DELETE FROM snippet_tags WHERE snippet_id = ?1;", [id])?;
        let tags = link_tags_in_tx(&tx, id, &tag_names)?;
        tx.commit()?;

        snippet.tags = tags;
        debug!(
            "event=snippet_update module=repo backend=sqlite status=ok snippet_id={id} tag_count={}",
            snippet.tags.len()
        );
        Ok(())
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(Tag {
                id: Some(row.get("id")?),
                name: row.get("name")?,
            });
        }
        Ok(tags)
    }
}

/// Inserts-or-reuses each tag row by name and links it to the snippet.
///
/// Returned tags carry the stored spelling, which may differ in case from
/// `names` when the tag already existed.
fn link_tags_in_tx(
    tx: &Transaction<'_>,
    snippet_id: SnippetId,
    names: &[String],
) -> RepoResult<Vec<Tag>> {
    let mut tags = Vec::with_capacity(names.len());
    for name in names {
        tx.execute(
            "INSERT OR IGNORE INTO tags (name) VALUES (?1);",
            [name.as_str()],
        )?;
        let (tag_id, stored_name): (i64, String) = tx.query_row(
            "SELECT id, name FROM tags WHERE name = ?1;",
            [name.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        tx.execute(
            "INSERT INTO snippet_tags (snippet_id, tag_id) VALUES (?1, ?2);",
            params![snippet_id, tag_id],
        )?;
        tags.push(Tag {
            id: Some(tag_id),
            name: stored_name,
        });
    }
    Ok(tags)
}

fn load_tags_for_snippet(conn: &Connection, snippet_id: SnippetId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name
         FROM snippet_tags st
         INNER JOIN tags t ON t.id = st.tag_id
         WHERE st.snippet_id = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([snippet_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(Tag {
            id: Some(row.get(0)?),
            name: row.get(1)?,
        });
    }
    Ok(tags)
}

fn snippet_exists_in_tx(tx: &Transaction<'_>, id: SnippetId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM snippets WHERE id = ?1);",
        [id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Highest id `AUTOINCREMENT` has handed out, including deleted ones.
fn last_assigned_id_in_tx(tx: &Transaction<'_>) -> RepoResult<SnippetId> {
    let last: SnippetId = tx.query_row(
        "SELECT max(
            COALESCE((SELECT seq FROM sqlite_sequence WHERE name = 'snippets'), 0),
            COALESCE((SELECT max(id) FROM snippets), 0)
        );",
        [],
        |row| row.get(0),
    )?;
    Ok(last)
}

fn parse_snippet_row(row: &Row<'_>) -> RepoResult<Snippet> {
    let language_text: String = row.get("language")?;
    let language = language_text.parse::<Language>().map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid language `{language_text}` in snippets.language"
        ))
    })?;

    let favorite = match row.get::<_, i64>("favorite")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid favorite value `{other}` in snippets.favorite"
            )));
        }
    };

    Ok(Snippet {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        code: row.get("code")?,
        description: row.get("description")?,
        language,
        favorite,
        tags: Vec::new(),
    })
}
