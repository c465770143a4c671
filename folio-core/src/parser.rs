//! Content parsing: read, cache check, hook invocation, front-matter
//! extraction, markdown conversion, and identity assignment.

use crate::cache::{content_hash, ArticleCache};
use crate::config::Config;
use crate::frontmatter::{split_front_matter, FrontmatterError};
use crate::hooks::ExtensionChain;
use crate::identity::{article_id, slugify};
use crate::markdown::MarkdownConverter;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use folio_types::{Article, ArticleKind};
use serde_yaml::{Mapping, Value as Yaml};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;
use walkdir::WalkDir;

/// Text-content extensions matched during discovery
pub const CONTENT_EXTENSIONS: &[&str] = &["md", "markdown"];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("file is not valid UTF-8")]
    NotUtf8,

    #[error("front matter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

pub struct ContentParser<'a> {
    config: &'a Config,
    chain: &'a ExtensionChain,
    cache: ArticleCache,
    converter: MarkdownConverter,
}

impl<'a> ContentParser<'a> {
    pub fn new(config: &'a Config, chain: &'a ExtensionChain) -> Self {
        Self {
            cache: ArticleCache::new(config.source_dir()),
            converter: MarkdownConverter::new(),
            config,
            chain,
        }
    }

    /// Parse one content file into an article.
    ///
    /// A valid cache entry short-circuits all further work. Any failure is
    /// logged and yields `None`, so the rest of the build continues.
    pub fn parse_file(&self, path: &Path, kind: ArticleKind) -> Option<Article> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(path = %path.display(), "failed to read content file: {err}");
                return None;
            }
        };
        let hash = content_hash(&bytes);

        if let Some(article) = self.cache.read(path, &hash) {
            tracing::debug!(path = %path.display(), "cache hit");
            return Some(article);
        }

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(_) => {
                tracing::error!(path = %path.display(), "{}", ParseError::NotUtf8);
                return None;
            }
        };

        // Extensions may rewrite the raw text before front-matter extraction
        let text = self.chain.on_parse_file(path, text, kind);

        match self.build_article(path, kind, &text) {
            Ok(article) => {
                self.cache.write(path, &hash, &article);
                Some(article)
            }
            Err(err) => {
                tracing::error!(path = %path.display(), "failed to parse {}: {err}", kind.as_str());
                None
            }
        }
    }

    fn build_article(
        &self,
        path: &Path,
        kind: ArticleKind,
        text: &str,
    ) -> Result<Article, ParseError> {
        let (front, body) = split_front_matter(text)?;

        let file_stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");

        let title = front_string(&front, "title").unwrap_or_else(|| file_stem.to_string());
        let alias = front_string(&front, "alias").unwrap_or_else(|| slugify(&title));

        // Explicit id in front matter wins; otherwise identity derives from
        // the kind namespace plus the alias/title/file-stem seed.
        let seed = front_string(&front, "alias")
            .or_else(|| front_string(&front, "title"))
            .unwrap_or_else(|| file_stem.to_string());
        let id =
            front_string(&front, "id").unwrap_or_else(|| article_id(kind.namespace(), &seed));

        let created = front_string(&front, "date")
            .and_then(|raw| parse_datetime(&raw))
            .unwrap_or_else(Utc::now);
        let updated = front_string(&front, "updated")
            .and_then(|raw| parse_datetime(&raw))
            .unwrap_or(created);

        let mut article = Article::empty(kind);
        article.id = id;
        article.title = title;
        article.alias = alias;
        article.date = front_string(&front, "date").unwrap_or_else(|| format_datetime(created));
        article.updated =
            front_string(&front, "updated").unwrap_or_else(|| format_datetime(updated));
        article.created_timestamp = created.timestamp_millis();
        article.updated_timestamp = updated.timestamp_millis();
        article.categories = front_string_list(&front, "categories");
        article.tags = front_string_list(&front, "tags");
        article.excerpt = front_string(&front, "excerpt").unwrap_or_default();
        article.cover = front_string(&front, "cover").unwrap_or_default();
        article.html = self.converter.to_html(&body);
        article.toc = self.converter.to_toc(&body);
        article.symbols_count = body.graphemes(true).count();
        article.raw = body;

        article.authors = {
            let authors = front_string_list(&front, "authors");
            if authors.is_empty() {
                vec![self.default_author_id()]
            } else {
                authors
            }
        };

        if kind == ArticleKind::Author {
            article.is_default = Some(false);
        }

        // Explicit precedence step: the full front-matter map is merged on
        // top of the computed fields, so front matter always wins.
        merge_front_matter(&mut article, &front);

        Ok(article)
    }

    fn default_author_id(&self) -> String {
        article_id(
            ArticleKind::Author.namespace(),
            &self.config.default_author.name,
        )
    }
}

/// Merge the entire front-matter map over an article's computed fields.
///
/// Recognized keys overwrite their typed field; everything else lands in the
/// open `extra` map and survives untouched.
pub(crate) fn merge_front_matter(article: &mut Article, front: &Mapping) {
    for (key, value) in front {
        let Some(key) = key.as_str() else {
            tracing::warn!("ignoring non-string front matter key");
            continue;
        };
        match key {
            "id" => set_string(&mut article.id, value),
            "title" => set_string(&mut article.title, value),
            "alias" => set_string(&mut article.alias, value),
            "cover" => set_string(&mut article.cover, value),
            "excerpt" => set_string(&mut article.excerpt, value),
            "date" => set_string(&mut article.date, value),
            "updated" => set_string(&mut article.updated, value),
            "html" => set_string(&mut article.html, value),
            "raw" => set_string(&mut article.raw, value),
            "toc" => set_string(&mut article.toc, value),
            "createdTimestamp" => {
                if let Some(n) = value.as_i64() {
                    article.created_timestamp = n;
                }
            }
            "updatedTimestamp" => {
                if let Some(n) = value.as_i64() {
                    article.updated_timestamp = n;
                }
            }
            "symbolsCount" => {
                if let Some(n) = value.as_u64() {
                    article.symbols_count = n as usize;
                }
            }
            "published" => {
                if let Some(b) = value.as_bool() {
                    article.published = b;
                }
            }
            "isDefault" => {
                if let Some(b) = value.as_bool() {
                    article.is_default = Some(b);
                }
            }
            "categories" => article.categories = string_list(value),
            "tags" => article.tags = string_list(value),
            "authors" => article.authors = string_list(value),
            // Structural: fixed by the source directory
            "kind" => {}
            _ => match serde_json::to_value(value) {
                Ok(json) => {
                    article.extra.insert(key.to_string(), json);
                }
                Err(err) => {
                    tracing::warn!(key, "dropping unserializable front matter field: {err}");
                }
            },
        }
    }
}

fn set_string(field: &mut String, value: &Yaml) {
    if let Some(s) = scalar_string(value) {
        *field = s;
    }
}

fn scalar_string(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_list(value: &Yaml) -> Vec<String> {
    match value {
        Yaml::Sequence(seq) => seq.iter().filter_map(scalar_string).collect(),
        Yaml::String(_) | Yaml::Number(_) => scalar_string(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn front_string(front: &Mapping, key: &str) -> Option<String> {
    front.get(key).and_then(scalar_string)
}

fn front_string_list(front: &Mapping, key: &str) -> Vec<String> {
    front.get(key).map(string_list).unwrap_or_default()
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Parse an auxiliary JSON/YAML config file, keyed by its base file name.
///
/// Config files are always re-read; they never go through the cache.
pub fn parse_config_file(path: &Path) -> Option<(String, serde_json::Value)> {
    let stem = path.file_stem()?.to_str()?.to_string();
    let ext = path.extension().and_then(|e| e.to_str())?;

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::error!(path = %path.display(), "failed to read config file: {err}");
            return None;
        }
    };

    let parsed = match ext {
        "json" => serde_json::from_str::<serde_json::Value>(&text).map_err(|e| e.to_string()),
        "yml" | "yaml" => serde_yaml::from_str::<serde_yaml::Value>(&text)
            .map_err(|e| e.to_string())
            .and_then(|value| serde_json::to_value(value).map_err(|e| e.to_string())),
        _ => return None,
    };

    match parsed {
        Ok(value) => Some((stem, value)),
        Err(err) => {
            tracing::error!(path = %path.display(), "failed to parse config file: {err}");
            None
        }
    }
}

/// Discover content files under `dir` in stable lexical order.
///
/// An unreadable directory at the top level is an error for the caller to
/// escalate; unreadable nested entries are logged and skipped.
pub fn discover_files(dir: &Path, extensions: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        match entry {
            Ok(entry) if entry.file_type().is_file() => {
                if let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) {
                    if extensions.contains(&ext) {
                        files.push(entry.into_path());
                    }
                }
            }
            Ok(_) => {}
            Err(err) if err.depth() == 0 => {
                return Err(err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("unreadable directory")));
            }
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {err}");
            }
        }
    }
    Ok(files)
}
