//! Article storage and access control
//!
//! The pipeline treats an article's `content` as opaque text. This module
//! provides the store it is read from and written back to: a small
//! create/read/update/delete interface with a unique slug per article, and
//! admin-only writes.

mod auth;
mod dir;
mod memory;

pub use auth::{Principal, Role};
pub use dir::DirStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// An article as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier, also used as the file name by [`DirStore`]
    pub id: String,

    /// URL slug, unique across the store
    pub slug: String,

    /// Headline
    pub title: String,

    /// Category name, if filed under one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Stored body: the serialized tree, legacy markup, plain text or nothing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    /// Create an article with no category
    pub fn new(
        id: impl Into<String>,
        slug: impl Into<String>,
        title: impl Into<String>,
        content: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            slug: slug.into(),
            title: title.into(),
            category: None,
            content,
        }
    }
}

/// Errors that can occur when reading or writing articles
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Article '{id}' not found")]
    NotFound { id: String },

    #[error("Article '{id}' already exists")]
    DuplicateId { id: String },

    #[error("Slug '{slug}' is already used by article '{existing}'")]
    DuplicateSlug { slug: String, existing: String },

    #[error("'{name}' is not allowed to modify articles (admin role required)")]
    Forbidden { name: String },

    #[error("Invalid article id '{id}': use letters, digits, '-' and '_' only")]
    InvalidId { id: String },

    #[error("IO error for {path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse article {path}: {source}", path = .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize article: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Key-addressable article storage
///
/// Reads are open to everyone; writes require an admin [`Principal`].
pub trait ArticleStore {
    /// Fetch one article
    fn get(&self, id: &str) -> Result<Article, StoreError>;

    /// All articles, ordered by id
    fn list(&self) -> Result<Vec<Article>, StoreError>;

    /// Add a new article; its id and slug must both be unused
    fn create(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError>;

    /// Replace an existing article; its slug must not belong to another one
    fn update(&mut self, principal: &Principal, article: Article) -> Result<(), StoreError>;

    /// Remove an article, returning what was stored
    fn delete(&mut self, principal: &Principal, id: &str) -> Result<Article, StoreError>;

    /// Look an article up by its slug
    fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, StoreError> {
        Ok(self.list()?.into_iter().find(|article| article.slug == slug))
    }
}

/// Fail if another article already uses `article.slug`
fn check_slug_unique<'a>(
    existing: impl IntoIterator<Item = &'a Article>,
    article: &Article,
) -> Result<(), StoreError> {
    match existing
        .into_iter()
        .find(|other| other.slug == article.slug && other.id != article.id)
    {
        Some(other) => Err(StoreError::DuplicateSlug {
            slug: article.slug.clone(),
            existing: other.id.clone(),
        }),
        None => Ok(()),
    }
}
