use naturedoc::config::{Config, CONFIG_FILE_NAME};
use naturedoc::pipeline::{self, is_current_encoding, migrate_store};
use naturedoc::store::{Article, ArticleStore, DirStore, Principal, Role, StoreError};
use naturedoc::{deserialize, render, RenderOptions};
use std::fs;

const EDITOR_STATE: &str = r#"{"root":{"children":[{"type":"paragraph","children":[{"type":"text","text":"Bees","format":1},{"type":"text","text":" return."}]}]}}"#;

fn seed(store: &mut DirStore) {
    let admin = Principal::admin("editor");
    let articles = [
        Article::new("bees", "bees-return", "Bees return", Some(EDITOR_STATE.to_string())),
        Article::new("fog", "fog", "Fog", Some("<p>Morning <b>fog</b></p>".to_string())),
        Article::new("moss", "moss", "Moss", Some("Moss grows slowly".to_string())),
        Article::new("stub", "stub", "Stub", None),
    ];
    for article in articles {
        store.create(&admin, article).unwrap();
    }
}

#[test]
fn test_config_points_at_store() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(
        &config_path,
        r#"
[render]
alignment = "style"

[store]
path = "content"

[principal]
name = "editor"
role = "admin"
"#,
    )
    .unwrap();

    let config = Config::load(&config_path).unwrap();

    assert_eq!(config.store_path(dir.path()), dir.path().join("content"));
    assert_eq!(config.principal.role, Role::Admin);
    assert_eq!(config.listing.excerpt_chars, 160);
    assert!(!config.render.standalone);
}

#[test]
fn test_migrate_directory_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path().join("articles"));
    seed(&mut store);
    let options = RenderOptions::default();
    let before = pipeline::render_articles(&store.list().unwrap(), &options);

    let report = migrate_store(&mut store, &Principal::admin("editor"), false).unwrap();

    assert_eq!(report.migrated, vec!["bees", "fog", "moss"]);
    assert_eq!(report.current, 0);
    assert_eq!(report.skipped, 1);

    for article in store.list().unwrap() {
        if let Some(content) = article.content.as_deref() {
            assert!(is_current_encoding(content), "{} not migrated", article.id);
        }
    }
    let after = pipeline::render_articles(&store.list().unwrap(), &options);
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.rendered.html, new.rendered.html, "for {}", old.id);
    }
    assert_eq!(
        after[0].rendered.html,
        "<p><strong>Bees</strong> return.</p>\n"
    );
}

#[test]
fn test_readers_cannot_write() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path());
    seed(&mut store);
    let reader = Principal::reader("visitor");

    let result = store.update(&reader, Article::new("moss", "moss", "Moss", None));

    assert!(matches!(result, Err(StoreError::Forbidden { .. })));
    assert!(matches!(
        migrate_store(&mut store, &reader, false),
        Err(StoreError::Forbidden { .. })
    ));
    assert_eq!(
        store.get("moss").unwrap().content.as_deref(),
        Some("Moss grows slowly")
    );
}

#[test]
fn test_slugs_stay_unique() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path());
    seed(&mut store);

    let result = store.create(
        &Principal::admin("editor"),
        Article::new("fog-2", "fog", "More fog", None),
    );

    assert!(matches!(
        result,
        Err(StoreError::DuplicateSlug { existing, .. }) if existing == "fog"
    ));
    assert_eq!(
        store.find_by_slug("bees-return").unwrap().map(|a| a.id),
        Some("bees".to_string())
    );
}

#[test]
fn test_listing_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path());
    seed(&mut store);

    let summaries = pipeline::summarize_articles(&store.list().unwrap(), 12);

    let moss = summaries.iter().find(|s| s.id == "moss").unwrap();
    assert_eq!(moss.word_count, 3);
    assert_eq!(moss.excerpt, "Moss grows…");
}

#[test]
fn test_stored_file_content_renders() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path());
    seed(&mut store);

    let bees = store.get("bees").unwrap();

    assert_eq!(
        render(&deserialize(bees.content.as_deref())),
        "<p><strong>Bees</strong> return.</p>\n"
    );
}
