//! Extension chain: ordered optional hooks around the build pipeline.
//!
//! Five extension points run in registration order. Reducer hooks pass each
//! extension's output to the next one; an extension that fails is logged and
//! its contribution discarded, leaving the value as it stood before it ran.

use crate::config::Config;
use folio_types::{ArticleKind, DatabaseDocument};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Context handed to observer hooks at generation start
pub struct BuildContext<'a> {
    pub config: &'a Config,
}

/// Boundary handle describing the external serving layer
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub address: String,
    pub port: u16,
}

/// A named extension with optional handlers for the five hook points.
///
/// Default implementations are pass-through, so extensions only override the
/// hooks they care about.
pub trait Extension: Send + Sync {
    fn name(&self) -> &'static str;

    /// Observer invoked before generation starts
    fn before_generate(&self, _context: &BuildContext) -> Result<(), ExtensionError> {
        Ok(())
    }

    /// Reducer over the in-progress database document
    fn after_generate(
        &self,
        document: DatabaseDocument,
    ) -> Result<DatabaseDocument, ExtensionError> {
        Ok(document)
    }

    /// Reducer over raw content text before front-matter extraction
    fn on_parse_file(
        &self,
        _path: &Path,
        text: String,
        _kind: ArticleKind,
    ) -> Result<String, ExtensionError> {
        Ok(text)
    }

    /// Reducer over rendered HTML for the external rendering layer
    fn on_render(
        &self,
        html: String,
        _context: &serde_json::Value,
    ) -> Result<String, ExtensionError> {
        Ok(html)
    }

    /// Observer invoked when the external server comes up
    fn on_server_start(&self, _server: &ServerInfo) -> Result<(), ExtensionError> {
        Ok(())
    }
}

/// The ordered set of loaded extensions.
///
/// Constructed once at build start and passed by reference to every pipeline
/// stage that needs it; there is no ambient registry.
pub struct ExtensionChain {
    extensions: Vec<Arc<dyn Extension>>,
}

impl ExtensionChain {
    pub fn empty() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    pub fn with_extensions(extensions: Vec<Arc<dyn Extension>>) -> Self {
        Self { extensions }
    }

    /// Assemble the chain from the available extensions, honoring the
    /// per-extension enable map in the configuration.
    pub fn load(available: Vec<Arc<dyn Extension>>, config: &Config) -> Self {
        let mut extensions = Vec::new();
        for extension in available {
            let name = extension.name();
            if !config.extension_enabled(name) {
                tracing::info!(extension = name, "extension disabled by configuration");
                continue;
            }
            tracing::debug!(extension = name, "extension loaded");
            extensions.push(extension);
        }
        Self { extensions }
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn before_generate(&self, context: &BuildContext) {
        for extension in &self.extensions {
            if let Err(err) = extension.before_generate(context) {
                log_hook_failure(extension.name(), "before-generate", &err);
            }
        }
    }

    pub fn after_generate(&self, document: DatabaseDocument) -> DatabaseDocument {
        let mut current = document;
        for extension in &self.extensions {
            match extension.after_generate(current.clone()) {
                Ok(next) => current = next,
                Err(err) => log_hook_failure(extension.name(), "after-generate", &err),
            }
        }
        current
    }

    pub fn on_parse_file(&self, path: &Path, text: String, kind: ArticleKind) -> String {
        let mut current = text;
        for extension in &self.extensions {
            match extension.on_parse_file(path, current.clone(), kind) {
                Ok(next) => current = next,
                Err(err) => log_hook_failure(extension.name(), "on-parse-file", &err),
            }
        }
        current
    }

    pub fn on_render(&self, html: String, context: &serde_json::Value) -> String {
        let mut current = html;
        for extension in &self.extensions {
            match extension.on_render(current.clone(), context) {
                Ok(next) => current = next,
                Err(err) => log_hook_failure(extension.name(), "on-render", &err),
            }
        }
        current
    }

    pub fn on_server_start(&self, server: &ServerInfo) {
        for extension in &self.extensions {
            if let Err(err) = extension.on_server_start(server) {
                log_hook_failure(extension.name(), "on-server-start", &err);
            }
        }
    }
}

fn log_hook_failure(extension: &str, hook: &str, err: &ExtensionError) {
    tracing::error!(extension, hook, "extension hook failed: {err}");
}
