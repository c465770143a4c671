//! Build and clean command implementations.

use anyhow::{Context, Result};
use folio_core::cache::CACHE_DIR;
use folio_core::{Config, Generator};
use std::fs;
use std::path::Path;

pub fn build(config_path: &Path) -> Result<()> {
    tracing::info!("loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("failed to load configuration")?;

    let generator = Generator::new(config);
    let document = generator.generate().context("build failed")?;

    let json = serde_json::to_string_pretty(&document)
        .context("failed to serialize database document")?;

    let out = generator.config().database_path();
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&out, json).with_context(|| format!("failed to write {}", out.display()))?;

    tracing::info!(
        posts = document.posts.len(),
        pages = document.pages.len(),
        authors = document.authors.len(),
        "database document written to {}",
        out.display()
    );
    Ok(())
}

pub fn clean(config_path: &Path) -> Result<()> {
    let config = Config::from_file(config_path).context("failed to load configuration")?;
    let cache_dir = config.source_dir().join(CACHE_DIR);

    if cache_dir.is_dir() {
        fs::remove_dir_all(&cache_dir)
            .with_context(|| format!("failed to remove {}", cache_dir.display()))?;
        tracing::info!("removed {}", cache_dir.display());
    } else {
        tracing::info!("cache already clean");
    }
    Ok(())
}
