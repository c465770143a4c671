//! Build orchestration: hook invocation, discovery, parsing, derivation,
//! and publication of the database document.

use crate::config::Config;
use crate::deriver;
use crate::extensions::builtin_extensions;
use crate::hooks::{BuildContext, ExtensionChain, ServerInfo};
use crate::parser::{discover_files, parse_config_file, ContentParser, CONTENT_EXTENSIONS};
use folio_types::{Article, ArticleKind, DatabaseDocument};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Optional auxiliary config subdirectories under the content root
pub const CONFIG_DIRS: &[&str] = &["json", "yaml"];

const CONFIG_EXTENSIONS: &[&str] = &["json", "yml", "yaml"];

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("content directory {0} is unreadable: {1}")]
    ContentDir(PathBuf, std::io::Error),
}

/// Orchestrates one build run.
///
/// The extension chain is constructed once here and passed by reference to
/// every stage that needs it.
pub struct Generator {
    config: Config,
    chain: ExtensionChain,
}

impl Generator {
    pub fn new(config: Config) -> Self {
        let chain = ExtensionChain::load(builtin_extensions(), &config);
        Self { config, chain }
    }

    /// Build with an explicit extension chain instead of the built-in set
    pub fn with_chain(config: Config, chain: ExtensionChain) -> Self {
        Self { config, chain }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn chain(&self) -> &ExtensionChain {
        &self.chain
    }

    /// Run the full pipeline and publish one consistent document.
    ///
    /// Per-file and per-extension failures are logged and skipped; only an
    /// unreadable content directory fails the build, and no partial document
    /// is ever published.
    pub fn generate(&self) -> Result<DatabaseDocument, BuildError> {
        let context = BuildContext {
            config: &self.config,
        };
        self.chain.before_generate(&context);

        let parser = ContentParser::new(&self.config, &self.chain);
        let posts = self.parse_kind(&parser, ArticleKind::Post)?;
        let pages = self.parse_kind(&parser, ArticleKind::Page)?;
        let authors = self.parse_kind(&parser, ArticleKind::Author)?;
        let configs = self.parse_configs();

        tracing::info!(
            posts = posts.len(),
            pages = pages.len(),
            authors = authors.len(),
            "parsed content tree"
        );

        let document = deriver::assemble(posts, pages, authors, configs, &self.config);
        Ok(self.chain.after_generate(document))
    }

    fn parse_kind(
        &self,
        parser: &ContentParser,
        kind: ArticleKind,
    ) -> Result<Vec<Article>, BuildError> {
        let dir = self.config.source_dir().join(kind.dir_name());
        let files = discover_files(&dir, CONTENT_EXTENSIONS)
            .map_err(|err| BuildError::ContentDir(dir.clone(), err))?;

        // Cache file paths are hash-derived and never collide across files;
        // the deriver's sort reimposes output order regardless of completion
        // order.
        Ok(files
            .par_iter()
            .filter_map(|path| parser.parse_file(path, kind))
            .collect())
    }

    fn parse_configs(&self) -> BTreeMap<String, serde_json::Value> {
        let mut configs = BTreeMap::new();
        for dir_name in CONFIG_DIRS {
            let dir = self.config.source_dir().join(dir_name);
            if !dir.is_dir() {
                continue;
            }
            let files = match discover_files(&dir, CONFIG_EXTENSIONS) {
                Ok(files) => files,
                Err(err) => {
                    tracing::warn!(dir = %dir.display(), "skipping config directory: {err}");
                    continue;
                }
            };
            for path in files {
                if let Some((key, value)) = parse_config_file(&path) {
                    if configs.insert(key.clone(), value).is_some() {
                        tracing::warn!(key, "duplicate config key; keeping the later file");
                    }
                }
            }
        }
        configs
    }

    /// Drive the on-render hook chain for the external rendering layer
    pub fn render_hook(&self, html: String, context: &serde_json::Value) -> String {
        self.chain.on_render(html, context)
    }

    /// Notify extensions that the external server came up
    pub fn server_started(&self, server: &ServerInfo) {
        self.chain.on_server_start(server);
    }
}
