//! Shared types for folio
//!
//! This crate provides the content model shared across the folio ecosystem:
//! articles, the normalized category/tag entities derived from them, the
//! join relations between posts and those entities, and the database
//! document handed to the rendering layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variant tag for a parsed content file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleKind {
    Post,
    Page,
    Author,
}

impl ArticleKind {
    /// Identity namespace for this kind (`post:`, `page:`, `author:`)
    pub fn namespace(&self) -> &'static str {
        match self {
            ArticleKind::Post => "post:",
            ArticleKind::Page => "page:",
            ArticleKind::Author => "author:",
        }
    }

    /// Content subdirectory this kind is discovered under
    pub fn dir_name(&self) -> &'static str {
        match self {
            ArticleKind::Post => "posts",
            ArticleKind::Page => "pages",
            ArticleKind::Author => "authors",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleKind::Post => "post",
            ArticleKind::Page => "page",
            ArticleKind::Author => "author",
        }
    }
}

/// A parsed content file: post, page, or author profile.
///
/// Recognized front-matter fields land in the typed fields below; everything
/// else survives untouched in `extra` and is flattened back on
/// serialization. Front matter wins over computed defaults at merge time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable identifier, derived from kind namespace + alias-or-title
    /// unless the source overrides it
    pub id: String,

    pub kind: ArticleKind,

    pub title: String,

    /// URL slug
    pub alias: String,

    /// Cover image reference
    #[serde(default)]
    pub cover: String,

    /// Human-readable creation timestamp
    #[serde(default)]
    pub date: String,

    /// Human-readable update timestamp
    #[serde(default)]
    pub updated: String,

    /// Creation time as epoch milliseconds
    #[serde(default)]
    pub created_timestamp: i64,

    /// Update time as epoch milliseconds
    #[serde(default)]
    pub updated_timestamp: i64,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub excerpt: String,

    /// Defaults to true unless the source explicitly sets it false
    #[serde(default = "default_true")]
    pub published: bool,

    /// Rendered HTML body
    #[serde(default)]
    pub html: String,

    /// Raw source body (without front matter)
    #[serde(default)]
    pub raw: String,

    /// Table-of-contents HTML
    #[serde(default)]
    pub toc: String,

    /// Grapheme count of the raw body
    #[serde(default)]
    pub symbols_count: usize,

    /// Author identifiers; defaults to the single default-author id
    #[serde(default)]
    pub authors: Vec<String>,

    /// Author profiles only: whether this is the synthesized/default author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,

    /// Unrecognized front-matter fields, preserved verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn default_true() -> bool {
    true
}

impl Article {
    /// Skeleton article with identity fields set and everything else empty
    pub fn empty(kind: ArticleKind) -> Self {
        Self {
            id: String::new(),
            kind,
            title: String::new(),
            alias: String::new(),
            cover: String::new(),
            date: String::new(),
            updated: String::new(),
            created_timestamp: 0,
            updated_timestamp: 0,
            categories: Vec::new(),
            tags: Vec::new(),
            excerpt: String::new(),
            published: true,
            html: String::new(),
            raw: String::new(),
            toc: String::new(),
            symbols_count: 0,
            authors: Vec::new(),
            is_default: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn is_post(&self) -> bool {
        self.kind == ArticleKind::Post
    }
}

/// Normalized category entity, unique by name within one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Normalized tag entity, unique by name within one build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
}

/// Join relation between a post and a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCategory {
    pub id: String,
    pub post_id: String,
    pub category_id: String,
}

/// Join relation between a post and a tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTag {
    pub id: String,
    pub post_id: String,
    pub tag_id: String,
}

/// The root aggregate produced by one build run.
///
/// Posts are ordered newest first, pages alphabetically by title, and the
/// author list is never empty. Auxiliary config maps are flattened under
/// their derived keys. Immutable once handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseDocument {
    pub posts: Vec<Article>,
    pub pages: Vec<Article>,
    pub authors: Vec<Article>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub post_categories: Vec<PostCategory>,
    pub post_tags: Vec<PostTag>,

    /// One entry per discovered auxiliary config file, keyed by file stem
    #[serde(flatten)]
    pub configs: BTreeMap<String, serde_json::Value>,
}
