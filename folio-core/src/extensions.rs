//! Built-in extensions shipped with the pipeline.
//!
//! Each one can be disabled individually through the `extensions` map in the
//! site configuration.

use crate::hooks::{Extension, ExtensionError};
use folio_types::DatabaseDocument;
use std::sync::Arc;

/// Reading speed used for the `readingTime` estimate, in symbols per minute
const SYMBOLS_PER_MINUTE: usize = 500;

/// Adds an estimated `readingTime` (whole minutes) to every post, derived
/// from its symbol count.
#[derive(Debug, Default)]
pub struct ReadingTime;

impl Extension for ReadingTime {
    fn name(&self) -> &'static str {
        "reading-time"
    }

    fn after_generate(
        &self,
        mut document: DatabaseDocument,
    ) -> Result<DatabaseDocument, ExtensionError> {
        for post in &mut document.posts {
            let minutes = post.symbols_count.div_ceil(SYMBOLS_PER_MINUTE).max(1);
            post.extra
                .insert("readingTime".to_string(), serde_json::json!(minutes));
        }
        Ok(document)
    }
}

/// All extensions available to a build, in registration order
pub fn builtin_extensions() -> Vec<Arc<dyn Extension>> {
    vec![Arc::new(ReadingTime)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::{Article, ArticleKind};

    #[test]
    fn test_reading_time_added_to_posts() {
        let mut document = DatabaseDocument::default();
        let mut post = Article::empty(ArticleKind::Post);
        post.symbols_count = 1200;
        document.posts.push(post);

        let document = ReadingTime.after_generate(document).unwrap();
        assert_eq!(
            document.posts[0].extra.get("readingTime"),
            Some(&serde_json::json!(3))
        );
    }

    #[test]
    fn test_reading_time_minimum_one_minute() {
        let mut document = DatabaseDocument::default();
        document.posts.push(Article::empty(ArticleKind::Post));

        let document = ReadingTime.after_generate(document).unwrap();
        assert_eq!(
            document.posts[0].extra.get("readingTime"),
            Some(&serde_json::json!(1))
        );
    }
}
