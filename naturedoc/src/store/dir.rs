//! Directory-backed article store
//!
//! Each article lives in `<root>/<id>.toml`. The directory is created on the
//! first write.

use super::{check_slug_unique, Article, ArticleStore, Principal, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Article store keeping one TOML file per article
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Create a store over `root` (which need not exist yet)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the article files
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId { id: id.to_string() });
        }
        Ok(self.root.join(format!("{id}.toml")))
    }

    fn read_article(path: &Path) -> Result<Article, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write_article(&self, path: &Path, article: &Article) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(article)?;
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;
        fs::write(path, content).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl ArticleStore for DirStore {
    fn get(&self, id: &str) -> Result<Article, StoreError> {
        let path = self.path_for(id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        Self::read_article(&path)
    }

    fn list(&self) -> Result<Vec<Article>, StoreError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path().is_file() && e.path().extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .map(|e| Self::read_article(e.path()))
            .collect()
    }

    fn create(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError> {
        principal.require_admin()?;
        let path = self.path_for(&article.id)?;
        if path.exists() {
            return Err(StoreError::DuplicateId { id: article.id });
        }
        check_slug_unique(&self.list()?, &article)?;

        self.write_article(&path, &article)?;
        log::info!("Created article '{}' at {}", article.id, path.display());
        Ok(())
    }

    fn update(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError> {
        principal.require_admin()?;
        let path = self.path_for(&article.id)?;
        if !path.is_file() {
            return Err(StoreError::NotFound { id: article.id });
        }
        check_slug_unique(&self.list()?, &article)?;

        self.write_article(&path, &article)?;
        log::info!("Updated article '{}'", article.id);
        Ok(())
    }

    fn delete(&mut self, principal: &Principal, id: &str) -> Result<Article, StoreError> {
        principal.require_admin()?;
        let article = self.get(id)?;
        let path = self.path_for(id)?;
        fs::remove_file(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        log::info!("Deleted article '{}'", id);
        Ok(article)
    }
}
