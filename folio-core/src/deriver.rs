//! Relational derivation: normalized category/tag entities, join relations,
//! and final assembly of the database document.

use crate::config::Config;
use crate::identity::{article_id, relation_id, slugify, CATEGORY_NAMESPACE, TAG_NAMESPACE};
use folio_types::{
    Article, ArticleKind, Category, DatabaseDocument, PostCategory, PostTag, Tag,
};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct Derived {
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub post_categories: Vec<PostCategory>,
    pub post_tags: Vec<PostTag>,
}

/// Walk all posts once, collecting first-seen category/tag names into
/// deduplicated entity lists (insertion order = first-post-encountered
/// order) and emitting one relation per (post, name) pair actually present.
pub fn derive(posts: &[Article]) -> Derived {
    let mut derived = Derived::default();
    let mut category_ids: HashMap<String, String> = HashMap::new();
    let mut tag_ids: HashMap<String, String> = HashMap::new();
    let mut category_pairs: HashSet<(String, String)> = HashSet::new();
    let mut tag_pairs: HashSet<(String, String)> = HashSet::new();

    for post in posts {
        for name in &post.categories {
            let category_id = category_ids
                .entry(name.clone())
                .or_insert_with(|| {
                    let category = category_entity(name);
                    let id = category.id.clone();
                    derived.categories.push(category);
                    id
                })
                .clone();
            if category_pairs.insert((post.id.clone(), category_id.clone())) {
                derived.post_categories.push(PostCategory {
                    id: relation_id(&post.id, &category_id),
                    post_id: post.id.clone(),
                    category_id,
                });
            }
        }

        for name in &post.tags {
            let tag_id = tag_ids
                .entry(name.clone())
                .or_insert_with(|| {
                    let tag = tag_entity(name);
                    let id = tag.id.clone();
                    derived.tags.push(tag);
                    id
                })
                .clone();
            if tag_pairs.insert((post.id.clone(), tag_id.clone())) {
                derived.post_tags.push(PostTag {
                    id: relation_id(&post.id, &tag_id),
                    post_id: post.id.clone(),
                    tag_id,
                });
            }
        }
    }

    derived
}

fn category_entity(name: &str) -> Category {
    Category {
        id: article_id(CATEGORY_NAMESPACE, name),
        name: name.to_string(),
        description: format!("{name} related posts"),
        url: format!("/categories/{}/", slugify(name)),
    }
}

fn tag_entity(name: &str) -> Tag {
    Tag {
        id: article_id(TAG_NAMESPACE, name),
        name: name.to_string(),
        description: format!("{name} related posts"),
        url: format!("/tags/{}/", slugify(name)),
    }
}

/// Assemble the final database document.
///
/// Ordering is reimposed here regardless of parse completion order: posts by
/// creation time descending, pages by title ascending. An empty author list
/// is replaced with the synthesized default author.
pub fn assemble(
    mut posts: Vec<Article>,
    mut pages: Vec<Article>,
    mut authors: Vec<Article>,
    configs: BTreeMap<String, serde_json::Value>,
    config: &Config,
) -> DatabaseDocument {
    posts.sort_by(|a, b| {
        b.created_timestamp
            .cmp(&a.created_timestamp)
            .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
    pages.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });

    if authors.is_empty() {
        tracing::info!("no author profiles found; synthesizing default author");
        authors.push(default_author(config));
    }

    let derived = derive(&posts);

    DatabaseDocument {
        posts,
        pages,
        authors,
        categories: derived.categories,
        tags: derived.tags,
        post_categories: derived.post_categories,
        post_tags: derived.post_tags,
        configs,
    }
}

/// Synthesized author used when no author profiles were parsed.
///
/// Timestamps stay at epoch zero so repeated builds are byte-identical.
pub fn default_author(config: &Config) -> Article {
    let name = &config.default_author.name;
    let mut author = Article::empty(ArticleKind::Author);
    author.id = article_id(ArticleKind::Author.namespace(), name);
    author.title = name.clone();
    author.alias = slugify(name);
    author.excerpt = config.default_author.description.clone();
    author.authors = vec![author.id.clone()];
    author.is_default = Some(true);
    author
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_with(id: &str, ts: i64, categories: &[&str], tags: &[&str]) -> Article {
        let mut post = Article::empty(ArticleKind::Post);
        post.id = id.to_string();
        post.title = id.to_string();
        post.created_timestamp = ts;
        post.categories = categories.iter().map(|s| s.to_string()).collect();
        post.tags = tags.iter().map(|s| s.to_string()).collect();
        post
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let posts = vec![
            post_with("p1", 2, &["news", "tech"], &[]),
            post_with("p2", 1, &["tech", "life"], &[]),
        ];
        let derived = derive(&posts);
        let names: Vec<_> = derived.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["news", "tech", "life"]);
        assert_eq!(derived.post_categories.len(), 4);
    }

    #[test]
    fn test_tag_example_from_two_posts() {
        // Two posts tagged "go", one of them also tagged "rust"
        let posts = vec![
            post_with("p1", 2, &[], &["go", "rust"]),
            post_with("p2", 1, &[], &["go"]),
        ];
        let derived = derive(&posts);

        assert_eq!(derived.tags.len(), 2);
        assert_eq!(derived.post_tags.len(), 3);

        let go = derived.tags.iter().find(|t| t.name == "go").unwrap();
        let go_posts = derived
            .post_tags
            .iter()
            .filter(|r| r.tag_id == go.id)
            .count();
        assert_eq!(go_posts, 2);
    }

    #[test]
    fn test_no_duplicate_relations() {
        let posts = vec![post_with("p1", 1, &["news", "news"], &["go", "go"])];
        let derived = derive(&posts);
        assert_eq!(derived.categories.len(), 1);
        assert_eq!(derived.post_categories.len(), 1);
        assert_eq!(derived.post_tags.len(), 1);
    }

    #[test]
    fn test_relation_ids_are_idempotent() {
        let posts = vec![post_with("p1", 1, &["news"], &[])];
        let first = derive(&posts);
        let second = derive(&posts);
        assert_eq!(first.post_categories[0].id, second.post_categories[0].id);
    }

    #[test]
    fn test_assemble_orders_posts_and_pages() {
        let posts = vec![
            post_with("old", 1, &[], &[]),
            post_with("new", 3, &[], &[]),
            post_with("mid", 2, &[], &[]),
        ];
        let mut page_b = Article::empty(ArticleKind::Page);
        page_b.id = "b".into();
        page_b.title = "Beta".into();
        let mut page_a = Article::empty(ArticleKind::Page);
        page_a.id = "a".into();
        page_a.title = "alpha".into();

        let document = assemble(
            posts,
            vec![page_b, page_a],
            Vec::new(),
            BTreeMap::new(),
            &Config::default(),
        );

        let post_ids: Vec<_> = document.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(post_ids, vec!["new", "mid", "old"]);
        let page_titles: Vec<_> = document.pages.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(page_titles, vec!["alpha", "Beta"]);
    }

    #[test]
    fn test_default_author_synthesized() {
        let document = assemble(
            Vec::new(),
            Vec::new(),
            Vec::new(),
            BTreeMap::new(),
            &Config::default(),
        );
        assert_eq!(document.authors.len(), 1);
        assert_eq!(document.authors[0].is_default, Some(true));
        assert_eq!(document.authors[0].title, "admin");
    }

    #[test]
    fn test_parsed_authors_not_replaced() {
        let mut author = Article::empty(ArticleKind::Author);
        author.id = "real".into();
        author.is_default = Some(false);

        let document = assemble(
            Vec::new(),
            Vec::new(),
            vec![author],
            BTreeMap::new(),
            &Config::default(),
        );
        assert_eq!(document.authors.len(), 1);
        assert_eq!(document.authors[0].id, "real");
    }
}
