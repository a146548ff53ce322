use snipster_core::db::open_db_in_memory;
use snipster_core::{
    InMemorySnippetRepository, Language, RepoError, Snippet, SnippetRepository,
    SnippetValidationError, SqliteSnippetRepository,
};
use std::collections::BTreeSet;

/// Runs `test` once per backend on a fresh, empty store.
fn for_each_backend(test: impl Fn(&str, &mut dyn SnippetRepository)) {
    let mut memory = InMemorySnippetRepository::new();
    test("memory", &mut memory);

    let mut conn = open_db_in_memory().unwrap();
    let mut sqlite = SqliteSnippetRepository::try_new(&mut conn).unwrap();
    test("sqlite", &mut sqlite);
}

fn example_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new("Hello python", "print('Hello, World! 1')")
            .unwrap()
            .with_description("A simple hello world snippet")
            .with_language(Language::Python),
        Snippet::new(
            "Hello rust",
            "fn main() { \n\tprintln!(\"Hello World!\");\n}  ",
        )
        .unwrap()
        .with_description("A simple Rust hello world snippet")
        .with_language(Language::Rust),
        Snippet::new(
            "Hello World of golang",
            "package main\n\nimport \"fmt\"\n\nfunc main() {\n\tfmt.Println(\"Hello World!\")\n}",
        )
        .unwrap()
        .with_description("A simple Go hello world snippet")
        .with_language(Language::Golang),
        Snippet::new("Favorite Snippet", "print('Hello, Favorit World!')")
            .unwrap()
            .with_description("Favorit hello world snippet!!")
            .with_language(Language::Python)
            .with_favorite(true),
    ]
}

fn add_examples(repo: &mut dyn SnippetRepository) -> Vec<Snippet> {
    example_snippets()
        .into_iter()
        .map(|mut snippet| {
            repo.add(&mut snippet).unwrap();
            snippet
        })
        .collect()
}

fn hello(title: &str) -> Snippet {
    Snippet::new(title, "print('hello')").unwrap()
}

fn ids(snippets: &[Snippet]) -> Vec<i64> {
    snippets.iter().filter_map(|snippet| snippet.id).collect()
}

#[test]
fn add_assigns_ids_starting_at_one() {
    for_each_backend(|backend, repo| {
        let mut snippet = hello("first");
        let id = repo.add(&mut snippet).unwrap();
        assert_eq!(id, 1, "{backend}");
        assert_eq!(snippet.id, Some(1), "{backend}");
    });
}

#[test]
fn ids_keep_increasing_after_deletes() {
    for_each_backend(|backend, repo| {
        for title in ["one", "two", "three"] {
            repo.add(&mut hello(title)).unwrap();
        }
        repo.delete(1).unwrap();

        let mut fourth = hello("four");
        assert_eq!(repo.add(&mut fourth).unwrap(), 4, "{backend}");
        assert_eq!(ids(&repo.list().unwrap()), vec![2, 3, 4], "{backend}");
    });
}

#[test]
fn deleting_highest_id_never_recycles_it() {
    for_each_backend(|backend, repo| {
        repo.add(&mut hello("one")).unwrap();
        repo.add(&mut hello("two")).unwrap();
        repo.delete(2).unwrap();

        assert_eq!(repo.add(&mut hello("three")).unwrap(), 3, "{backend}");
    });
}

#[test]
fn list_returns_snippets_in_insertion_order() {
    for_each_backend(|backend, repo| {
        let added = add_examples(repo);
        let listed = repo.list().unwrap();
        assert_eq!(listed, added, "{backend}");
    });
}

#[test]
fn get_returns_added_snippet_and_none_when_missing() {
    for_each_backend(|backend, repo| {
        let added = add_examples(repo);
        assert_eq!(repo.get(2).unwrap().as_ref(), Some(&added[1]), "{backend}");
        assert_eq!(repo.get(99).unwrap(), None, "{backend}");
    });
}

#[test]
fn code_is_stored_verbatim() {
    for_each_backend(|backend, repo| {
        let code = "echo \"it's\" 'quoted'\n\tand\r\nindented\n";
        let mut snippet = Snippet::new("quotes", code).unwrap();
        let id = repo.add(&mut snippet).unwrap();
        assert_eq!(repo.get(id).unwrap().unwrap().code, code, "{backend}");
    });
}

#[test]
fn delete_then_get_is_none() {
    for_each_backend(|backend, repo| {
        repo.add(&mut hello("doomed")).unwrap();
        repo.delete(1).unwrap();
        assert!(repo.get(1).unwrap().is_none(), "{backend}");
        assert!(repo.list().unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn delete_missing_snippet_is_not_found() {
    for_each_backend(|backend, repo| {
        let err = repo.delete(99).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(99)), "{backend}: {err}");
    });
}

#[test]
fn favorite_toggles_on_missing_snippet_are_not_found() {
    for_each_backend(|backend, repo| {
        let on = repo.favorite_on(99).unwrap_err();
        assert!(matches!(on, RepoError::NotFound(99)), "{backend}: {on}");
        let off = repo.favorite_off(99).unwrap_err();
        assert!(matches!(off, RepoError::NotFound(99)), "{backend}: {off}");
    });
}

#[test]
fn favorite_on_returns_updated_record_but_leaves_old_copies_alone() {
    for_each_backend(|backend, repo| {
        repo.add(&mut hello("plain")).unwrap();
        let before = repo.list().unwrap();

        let updated = repo.favorite_on(1).unwrap();
        assert!(updated.favorite, "{backend}");
        assert!(!before[0].favorite, "{backend}: copies are not live");
        assert!(repo.get(1).unwrap().unwrap().favorite, "{backend}");
    });
}

#[test]
fn favorite_then_unfavorite_keeps_snippet_listed() {
    for_each_backend(|backend, repo| {
        repo.add(&mut hello("toggle me")).unwrap();
        repo.favorite_on(1).unwrap();
        assert_eq!(ids(&repo.list_favorites().unwrap()), vec![1], "{backend}");

        let updated = repo.favorite_off(1).unwrap();
        assert!(!updated.favorite, "{backend}");
        assert!(repo.list_favorites().unwrap().is_empty(), "{backend}");
        assert_eq!(ids(&repo.list().unwrap()), vec![1], "{backend}");
    });
}

#[test]
fn list_favorites_returns_exactly_the_favorite_subset() {
    for_each_backend(|backend, repo| {
        let added = add_examples(repo);
        repo.favorite_on(2).unwrap();

        let favorites = repo.list_favorites().unwrap();
        assert!(favorites.iter().all(|snippet| snippet.favorite), "{backend}");
        let expected = vec![added[1].id.unwrap(), added[3].id.unwrap()];
        assert_eq!(ids(&favorites), expected, "{backend}");
    });
}

#[test]
fn search_matches_title_substrings_case_insensitively() {
    for_each_backend(|backend, repo| {
        add_examples(repo);

        assert_eq!(repo.search("Hello python", None).unwrap().len(), 1, "{backend}");
        assert_eq!(repo.search("hello pytHON", None).unwrap().len(), 1, "{backend}");
        assert_eq!(repo.search("Hello rust", None).unwrap().len(), 1, "{backend}");
        assert_eq!(repo.search("HELLO", None).unwrap().len(), 3, "{backend}");
        assert_eq!(ids(&repo.search("hello", None).unwrap()), vec![1, 2, 3], "{backend}");
        assert_eq!(repo.search("world of", None).unwrap().len(), 1, "{backend}");
        assert!(repo.search("notfound", None).unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn search_language_filter_is_exact() {
    for_each_backend(|backend, repo| {
        add_examples(repo);

        let python = repo.search("Hello", Some(Language::Python)).unwrap();
        assert_eq!(ids(&python), vec![1], "{backend}");
        let all_python = repo.search("", Some(Language::Python)).unwrap();
        assert_eq!(ids(&all_python), vec![1, 4], "{backend}");
        assert!(
            repo.search("Hello", Some(Language::Sql)).unwrap().is_empty(),
            "{backend}"
        );
    });
}

#[test]
fn search_does_not_look_at_code_or_description() {
    for_each_backend(|backend, repo| {
        add_examples(repo);
        assert!(repo.search("println", None).unwrap().is_empty(), "{backend}");
        assert!(repo.search("simple", None).unwrap().is_empty(), "{backend}");
    });
}

#[test]
fn tags_round_trip_as_a_set() {
    for_each_backend(|backend, repo| {
        let mut snippet = Snippet::new("Tagged", "print('Hello, World!')")
            .unwrap()
            .with_tags(["test2", "test1"]);
        let id = repo.add(&mut snippet).unwrap();

        let fetched = repo.get(id).unwrap().unwrap();
        let names: BTreeSet<_> = fetched.tag_names().into_iter().collect();
        assert_eq!(names, BTreeSet::from(["test1", "test2"]), "{backend}");
        assert!(fetched.tags.iter().all(|tag| tag.id.is_some()), "{backend}");
        assert_eq!(fetched.tags, snippet.tags, "{backend}: add writes tags back");
    });
}

#[test]
fn tag_names_are_trimmed_and_case_variants_merged() {
    for_each_backend(|backend, repo| {
        let mut snippet = hello("tags")
            .with_tags(["  Shell  Scripts ", "shell scripts", "OPS"]);
        repo.add(&mut snippet).unwrap();
        assert_eq!(snippet.tag_names(), vec!["OPS", "Shell Scripts"], "{backend}");
    });
}

#[test]
fn mixed_case_tag_names_round_trip_unchanged() {
    for_each_backend(|backend, repo| {
        let mut snippet = hello("tagged").with_tags(["Rust", "DevOps"]);
        let id = repo.add(&mut snippet).unwrap();

        let fetched = repo.get(id).unwrap().unwrap();
        assert_eq!(fetched.tag_names(), vec!["DevOps", "Rust"], "{backend}");
        assert_eq!(snippet.tag_names(), vec!["DevOps", "Rust"], "{backend}");
    });
}

#[test]
fn existing_tag_keeps_its_first_spelling() {
    for_each_backend(|backend, repo| {
        let mut first = hello("first").with_tags(["PostgreSQL"]);
        let mut second = hello("second").with_tags(["postgresql"]);
        repo.add(&mut first).unwrap();
        repo.add(&mut second).unwrap();

        assert_eq!(second.tags, first.tags, "{backend}");
        let stored = repo.get(2).unwrap().unwrap();
        assert_eq!(stored.tag_names(), vec!["PostgreSQL"], "{backend}");
        assert_eq!(repo.list_tags().unwrap().len(), 1, "{backend}");
    });
}

#[test]
fn shared_tags_survive_deleting_one_snippet() {
    for_each_backend(|backend, repo| {
        let mut first = hello("first").with_tags(["shell", "ops"]);
        let mut second = hello("second").with_tags(["Shell"]);
        repo.add(&mut first).unwrap();
        repo.add(&mut second).unwrap();
        assert_eq!(first.tags[1].id, second.tags[0].id, "{backend}: one shared tag");

        repo.delete(1).unwrap();

        let remaining = repo.get(2).unwrap().unwrap();
        assert_eq!(remaining.tag_names(), vec!["shell"], "{backend}");
        let known: Vec<_> = repo
            .list_tags()
            .unwrap()
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        assert_eq!(known, vec!["ops".to_string(), "shell".to_string()], "{backend}");
    });
}

#[test]
fn add_rejects_invalid_snippets_without_storing_them() {
    for_each_backend(|backend, repo| {
        let mut no_title = hello("x");
        no_title.title = "   ".to_string();
        let err = repo.add(&mut no_title).unwrap_err();
        assert!(
            matches!(err, RepoError::Validation(SnippetValidationError::MissingTitle)),
            "{backend}: {err}"
        );

        let mut blank_tag = hello("y").with_tags([" "]);
        let err = repo.add(&mut blank_tag).unwrap_err();
        assert!(
            matches!(err, RepoError::Validation(SnippetValidationError::BlankTag)),
            "{backend}: {err}"
        );

        assert!(repo.list().unwrap().is_empty(), "{backend}");
        assert_eq!(no_title.id, None, "{backend}");
    });
}

#[test]
fn add_with_taken_preset_id_is_duplicate() {
    for_each_backend(|backend, repo| {
        repo.add(&mut hello("original")).unwrap();

        let mut clash = hello("clash");
        clash.id = Some(1);
        let err = repo.add(&mut clash).unwrap_err();
        assert!(matches!(err, RepoError::DuplicateId(1)), "{backend}: {err}");
        assert_eq!(repo.get(1).unwrap().unwrap().title, "original", "{backend}");
    });
}

#[test]
fn add_after_highest_possible_id_reports_ids_exhausted() {
    for_each_backend(|backend, repo| {
        let mut last = hello("last");
        last.id = Some(i64::MAX);
        repo.add(&mut last).unwrap();

        let mut next = hello("one too many");
        let err = repo.add(&mut next).unwrap_err();
        assert!(matches!(err, RepoError::IdsExhausted), "{backend}: {err}");
        assert_eq!(next.id, None, "{backend}");
        assert_eq!(ids(&repo.list().unwrap()), vec![i64::MAX], "{backend}");

        repo.delete(i64::MAX).unwrap();
        let err = repo.add(&mut next).unwrap_err();
        assert!(matches!(err, RepoError::IdsExhausted), "{backend}: after delete: {err}");
    });
}

#[test]
fn update_persists_fields_and_replaces_tags() {
    for_each_backend(|backend, repo| {
        let mut snippet = hello("draft").with_tags(["old"]);
        repo.add(&mut snippet).unwrap();

        snippet.title = "final".to_string();
        snippet.description = Some("edited".to_string());
        snippet.language = Language::Bash;
        snippet = snippet.with_tags(["new", "Fresh"]);
        repo.update(&mut snippet).unwrap();

        let stored = repo.get(1).unwrap().unwrap();
        assert_eq!(stored, snippet, "{backend}");
        assert_eq!(stored.tag_names(), vec!["Fresh", "new"], "{backend}");
        assert_eq!(repo.list_tags().unwrap().len(), 3, "{backend}: old tag kept");
    });
}

#[test]
fn update_reports_missing_and_unsaved_snippets() {
    for_each_backend(|backend, repo| {
        let mut unsaved = hello("never added");
        let err = repo.update(&mut unsaved).unwrap_err();
        assert!(matches!(err, RepoError::Unsaved), "{backend}: {err}");

        unsaved.id = Some(42);
        let err = repo.update(&mut unsaved).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(42)), "{backend}: {err}");
    });
}
