//! In-memory article store

use super::{check_slug_unique, Article, ArticleStore, Principal, StoreError};
use std::collections::BTreeMap;

/// Article store backed by a map, for tests and previews
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    articles: BTreeMap<String, Article>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl ArticleStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Article, StoreError> {
        self.articles
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })
    }

    fn list(&self) -> Result<Vec<Article>, StoreError> {
        Ok(self.articles.values().cloned().collect())
    }

    fn create(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError> {
        principal.require_admin()?;
        if self.articles.contains_key(&article.id) {
            return Err(StoreError::DuplicateId { id: article.id });
        }
        check_slug_unique(self.articles.values(), &article)?;

        log::info!("Created article '{}' ({})", article.id, article.slug);
        self.articles.insert(article.id.clone(), article);
        Ok(())
    }

    fn update(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError> {
        principal.require_admin()?;
        if !self.articles.contains_key(&article.id) {
            return Err(StoreError::NotFound { id: article.id });
        }
        check_slug_unique(self.articles.values(), &article)?;

        log::info!("Updated article '{}'", article.id);
        self.articles.insert(article.id.clone(), article);
        Ok(())
    }

    fn delete(&mut self, principal: &Principal, id: &str) -> Result<Article, StoreError> {
        principal.require_admin()?;
        let article = self
            .articles
            .remove(id)
            .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        log::info!("Deleted article '{}'", id);
        Ok(article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, slug: &str) -> Article {
        Article::new(id, slug, "Title", Some("Body".to_string()))
    }

    #[test]
    fn test_crud() {
        let admin = Principal::admin("ed");
        let mut store = MemoryStore::new();

        store.create(&admin, article("a1", "owls")).unwrap();
        assert_eq!(store.get("a1").unwrap().slug, "owls");

        let mut changed = article("a1", "barn-owls");
        changed.title = "Barn owls".to_string();
        store.update(&admin, changed).unwrap();
        assert_eq!(store.get("a1").unwrap().title, "Barn owls");
        assert!(store.find_by_slug("barn-owls").unwrap().is_some());

        let removed = store.delete(&admin, "a1").unwrap();
        assert_eq!(removed.slug, "barn-owls");
        assert!(store.is_empty());
        assert!(matches!(store.get("a1"), Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_slug_must_be_unique() {
        let admin = Principal::admin("ed");
        let mut store = MemoryStore::new();
        store.create(&admin, article("a1", "owls")).unwrap();
        store.create(&admin, article("a2", "larks")).unwrap();

        let result = store.create(&admin, article("a3", "owls"));
        assert!(matches!(
            result,
            Err(StoreError::DuplicateSlug { existing, .. }) if existing == "a1"
        ));

        let result = store.update(&admin, article("a2", "owls"));
        assert!(matches!(result, Err(StoreError::DuplicateSlug { .. })));

        // Keeping its own slug is fine
        store.update(&admin, article("a1", "owls")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_id() {
        let admin = Principal::admin("ed");
        let mut store = MemoryStore::new();
        store.create(&admin, article("a1", "owls")).unwrap();

        let result = store.create(&admin, article("a1", "other"));
        assert!(matches!(result, Err(StoreError::DuplicateId { .. })));
    }

    #[test]
    fn test_readers_cannot_write() {
        let mut store = MemoryStore::new();
        let reader = Principal::reader("visitor");

        let result = store.create(&reader, article("a1", "owls"));

        assert!(matches!(result, Err(StoreError::Forbidden { .. })));
        assert!(store.is_empty());
    }
}
