//! Command dispatch against the snippet repository contract.
//!
//! # Invariants
//! - Commands only talk to `dyn SnippetRepository`; backend choice happens
//!   in `main`.
//! - Code bodies are printed only by `get`.

use crate::cli::Command;
use anyhow::Context;
use log::info;
use snipster_core::{Snippet, SnippetRepository, Tag};
use std::io::Write;

/// Output rendering for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Runs one command and writes its result to `out`.
pub fn execute(
    command: Command,
    repo: &mut dyn SnippetRepository,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let name = command.name();
    match command {
        Command::Add {
            title,
            code,
            file,
            description,
            language,
            tags,
            favorite,
        } => {
            let code = match (code, file) {
                (Some(code), _) => code,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read snippet file `{}`", path.display()))?,
                (None, None) => anyhow::bail!("either --code or --file is required"),
            };
            let mut snippet = Snippet::new(title, code)?
                .with_language(language.unwrap_or_default())
                .with_favorite(favorite)
                .with_tags(tags);
            snippet.description = description;

            let id = repo.add(&mut snippet)?;
            info!("event=cli_command module=cli status=ok command={name} snippet_id={id}");
            write_snippet(out, format, &snippet)
        }
        Command::Get { id } => {
            let snippet = repo
                .get(id)?
                .with_context(|| format!("snippet not found: {id}"))?;
            match format {
                OutputFormat::Json => write_json(out, &snippet),
                OutputFormat::Text => {
                    writeln!(out, "{}", summary_line(&snippet))?;
                    if let Some(description) = snippet.description.as_deref() {
                        writeln!(out, "{description}")?;
                    }
                    writeln!(out)?;
                    writeln!(out, "{}", snippet.code)?;
                    Ok(())
                }
            }
        }
        Command::List { favorites } => {
            let snippets = if favorites {
                repo.list_favorites()?
            } else {
                repo.list()?
            };
            write_snippets(out, format, &snippets)
        }
        Command::Delete { id } => {
            repo.delete(id)?;
            info!("event=cli_command module=cli status=ok command={name} snippet_id={id}");
            match format {
                OutputFormat::Json => write_json(out, &serde_json::json!({ "deleted": id })),
                OutputFormat::Text => Ok(writeln!(out, "deleted snippet {id}")?),
            }
        }
        Command::Search { query, language } => {
            let snippets = repo.search(&query, language)?;
            write_snippets(out, format, &snippets)
        }
        Command::Fav { id } => {
            let snippet = repo.favorite_on(id)?;
            write_snippet(out, format, &snippet)
        }
        Command::Unfav { id } => {
            let snippet = repo.favorite_off(id)?;
            write_snippet(out, format, &snippet)
        }
        Command::Tags => {
            let tags = repo.list_tags()?;
            match format {
                OutputFormat::Json => write_json(out, &tags),
                OutputFormat::Text => {
                    for tag in &tags {
                        writeln!(out, "{}", tag.name)?;
                    }
                    Ok(())
                }
            }
        }
    }
}

/// One-line listing: id, favorite marker, title, language and tags.
pub fn summary_line(snippet: &Snippet) -> String {
    let id = snippet
        .id
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    let marker = if snippet.favorite { '*' } else { ' ' };
    let mut line = format!("{id:>4} {marker} {} [{}]", snippet.title, snippet.language);
    if !snippet.tags.is_empty() {
        line.push(' ');
        line.push_str(&format_tags(&snippet.tags));
    }
    line
}

fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag.name))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_snippet(
    out: &mut dyn Write,
    format: OutputFormat,
    snippet: &Snippet,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, snippet),
        OutputFormat::Text => Ok(writeln!(out, "{}", summary_line(snippet))?),
    }
}

fn write_snippets(
    out: &mut dyn Write,
    format: OutputFormat,
    snippets: &[Snippet],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, snippets),
        OutputFormat::Text => {
            if snippets.is_empty() {
                writeln!(out, "no snippets")?;
            }
            for snippet in snippets {
                writeln!(out, "{}", summary_line(snippet))?;
            }
            Ok(())
        }
    }
}

fn write_json<T>(out: &mut dyn Write, value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
