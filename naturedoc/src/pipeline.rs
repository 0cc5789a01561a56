//! End-to-end content pipeline
//!
//! Ties the stages together for callers holding stored article content:
//! 1. **Deserialize**: recover a document tree from whatever was stored
//! 2. **Render**: turn the tree into sanitized HTML
//! 3. **Serialize**: write trees back in the current encoding (migration)
//!
//! Each article is processed independently, so batches run in parallel when
//! the `parallel` feature is enabled.

use crate::deserializer::{normalize, InputShape, RecoverableNodeError};
use crate::renderer::{render_with, RenderOptions};
use crate::serializer::serialize;
use crate::store::{Article, ArticleStore, Principal, StoreError};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Rendered article body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Sanitized HTML
    pub html: String,
    /// How the stored content was recognized
    pub shape: InputShape,
    /// Repairs and skipped nodes
    pub diagnostics: Vec<RecoverableNodeError>,
}

/// Rendered article with its identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArticle {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub rendered: Rendered,
}

/// Card data for listing pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub category: Option<String>,
    pub word_count: usize,
    pub image_count: usize,
    pub excerpt: String,
}

/// Outcome of re-encoding a store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Ids of articles whose content was (or would be) rewritten
    pub migrated: Vec<String>,
    /// Articles already in the current encoding
    pub current: usize,
    /// Articles with no content
    pub skipped: usize,
    /// Nodes removed while reading migrated content
    pub dropped_nodes: usize,
}

/// Render stored content
///
/// # Parameters
/// * `stored` - Content field as held by the article store, if any
/// * `options` - Renderer settings
///
/// # Returns
/// * `Rendered` - HTML plus what was recovered on the way; never fails
pub fn render_content(stored: Option<&str>, options: &RenderOptions) -> Rendered {
    let normalized = normalize(stored);
    Rendered {
        html: render_with(&normalized.document, options),
        shape: normalized.shape,
        diagnostics: normalized.diagnostics,
    }
}

/// Render one article
pub fn render_article(article: &Article, options: &RenderOptions) -> RenderedArticle {
    if article.content.is_none() {
        log::debug!("Article '{}' has no content", article.id);
    }
    RenderedArticle {
        id: article.id.clone(),
        slug: article.slug.clone(),
        title: article.title.clone(),
        rendered: render_content(article.content.as_deref(), options),
    }
}

/// Render many articles, preserving their order
pub fn render_articles(articles: &[Article], options: &RenderOptions) -> Vec<RenderedArticle> {
    #[cfg(feature = "parallel")]
    let rendered = articles
        .par_iter()
        .map(|article| render_article(article, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let rendered = articles
        .iter()
        .map(|article| render_article(article, options))
        .collect();

    rendered
}

/// Build the listing card for one article
pub fn summarize(article: &Article, excerpt_chars: usize) -> ArticleSummary {
    let document = normalize(article.content.as_deref()).document;
    ArticleSummary {
        id: article.id.clone(),
        slug: article.slug.clone(),
        title: article.title.clone(),
        category: article.category.clone(),
        word_count: document.word_count(),
        image_count: document.image_count(),
        excerpt: document.excerpt(excerpt_chars),
    }
}

/// Build listing cards for many articles, preserving their order
pub fn summarize_articles(articles: &[Article], excerpt_chars: usize) -> Vec<ArticleSummary> {
    #[cfg(feature = "parallel")]
    let summaries = articles
        .par_iter()
        .map(|article| summarize(article, excerpt_chars))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let summaries = articles
        .iter()
        .map(|article| summarize(article, excerpt_chars))
        .collect();

    summaries
}

/// Whether stored content is exactly what the serializer would write for it
pub fn is_current_encoding(stored: &str) -> bool {
    let normalized = normalize(stored);
    normalized.shape == InputShape::Structured
        && normalized.diagnostics.is_empty()
        && serialize(&normalized.document) == stored
}

/// Re-encode every article that is not in the current encoding
///
/// # Parameters
/// * `store` - Store to read from and write back to
/// * `principal` - Identity for the writes; must be an admin unless `dry_run`
/// * `dry_run` - Report what would change without writing
///
/// # Returns
/// * `Ok(MigrationReport)` - What was (or would be) migrated
/// * `Err(StoreError)` - Listing or writing failed, or the principal may not write
pub fn migrate_store<S: ArticleStore + ?Sized>(
    store: &mut S,
    principal: &Principal,
    dry_run: bool,
) -> Result<MigrationReport, StoreError> {
    if !dry_run {
        principal.require_admin()?;
    }

    let mut report = MigrationReport::default();
    for mut article in store.list()? {
        let Some(content) = article.content.as_deref() else {
            report.skipped += 1;
            continue;
        };
        if is_current_encoding(content) {
            report.current += 1;
            continue;
        }

        let normalized = normalize(content);
        log::info!(
            "Migrating article '{}' from {} content ({} recoveries)",
            article.id,
            normalized.shape,
            normalized.diagnostics.len()
        );
        report.dropped_nodes += normalized.dropped_count();
        report.migrated.push(article.id.clone());

        if !dry_run {
            article.content = Some(serialize(&normalized.document));
            store.update(principal, article)?;
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::Document;
    use crate::store::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let admin = Principal::admin("ed");
        let mut store = MemoryStore::new();
        let articles = [
            Article::new("a", "plain", "Plain", Some("Just words".to_string())),
            Article::new("b", "legacy", "Legacy", Some("<p>Old <i>markup</i></p>".to_string())),
            Article::new(
                "c",
                "current",
                "Current",
                Some(serialize(&Document::single_paragraph("Fresh"))),
            ),
            Article::new("d", "draft", "Draft", None),
        ];
        for article in articles {
            store.create(&admin, article).unwrap();
        }
        store
    }

    #[test]
    fn test_render_content_null() {
        let rendered = render_content(None, &RenderOptions::default());

        assert_eq!(rendered.html, "<p></p>\n");
        assert_eq!(rendered.shape, InputShape::Empty);
    }

    #[test]
    fn test_render_articles_keeps_order() {
        let store = seeded_store();
        let articles = store.list().unwrap();

        let rendered = render_articles(&articles, &RenderOptions::default());

        let ids: Vec<&str> = rendered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(
            rendered[1].rendered.html,
            "<p>&lt;p&gt;Old &lt;i&gt;markup&lt;/i&gt;&lt;/p&gt;</p>\n"
        );
    }

    #[test]
    fn test_summaries() {
        let store = seeded_store();

        let summaries = summarize_articles(&store.list().unwrap(), 160);

        assert_eq!(summaries[0].excerpt, "Just words");
        assert_eq!(summaries[0].word_count, 2);
        assert_eq!(summaries[3].word_count, 0);
        assert_eq!(summaries[3].excerpt, "");
    }

    #[test]
    fn test_is_current_encoding() {
        let current = serialize(&Document::single_paragraph("x"));
        assert!(is_current_encoding(&current));
        assert!(!is_current_encoding("x"));
        assert!(!is_current_encoding(&format!(" {current}")));
        assert!(!is_current_encoding(
            r#"{"root":{"children":[{"type":"paragraph","children":[]}]}}"#
        ));
    }

    #[test]
    fn test_migrate_store() {
        let mut store = seeded_store();
        let before = render_articles(&store.list().unwrap(), &RenderOptions::default());

        let report = migrate_store(&mut store, &Principal::admin("ed"), false).unwrap();

        assert_eq!(report.migrated, vec!["a", "b"]);
        assert_eq!(report.current, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.dropped_nodes, 0);

        // Rendering is unchanged by the migration
        let after = render_articles(&store.list().unwrap(), &RenderOptions::default());
        let html = |list: &[RenderedArticle]| {
            list.iter()
                .map(|r| r.rendered.html.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(html(&before), html(&after));

        // A second run has nothing left to do
        let again = migrate_store(&mut store, &Principal::admin("ed"), false).unwrap();
        assert!(again.migrated.is_empty());
        assert_eq!(again.current, 3);
    }

    #[test]
    fn test_migrate_dry_run_writes_nothing() {
        let mut store = seeded_store();

        let report = migrate_store(&mut store, &Principal::reader("visitor"), true).unwrap();

        assert_eq!(report.migrated.len(), 2);
        assert_eq!(
            store.get("a").unwrap().content.as_deref(),
            Some("Just words")
        );
    }

    #[test]
    fn test_migrate_requires_admin() {
        let mut store = seeded_store();

        let result = migrate_store(&mut store, &Principal::reader("visitor"), false);

        assert!(matches!(result, Err(StoreError::Forbidden { .. })));
    }
}
