//! Front matter extraction from content files.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter is not a mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX
        .get_or_init(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---[ \t]*(?:\n(.*))?$").unwrap())
}

/// Split a content file into its front matter mapping and body.
///
/// The front matter is kept as an open mapping so unrecognized fields
/// survive untouched. A file without a front matter block yields an empty
/// mapping with the full content as body.
pub fn split_front_matter(
    content: &str,
) -> Result<(serde_yaml::Mapping, String), FrontmatterError> {
    let Some(captures) = frontmatter_regex().captures(content) else {
        return Ok((serde_yaml::Mapping::new(), content.to_string()));
    };

    let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or("");
    let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let mapping = match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Mapping(mapping) => mapping,
        serde_yaml::Value::Null => serde_yaml::Mapping::new(),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    Ok((mapping, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let content = "---\ntitle: My Post\ndate: 2024-01-01\n---\n# Hello\n";
        let (front, body) = split_front_matter(content).unwrap();
        assert_eq!(front.get("title").and_then(|v| v.as_str()), Some("My Post"));
        assert!(body.starts_with("# Hello"));
    }

    #[test]
    fn test_split_without_front_matter() {
        let content = "# Just Content\n\nNo metadata here.";
        let (front, body) = split_front_matter(content).unwrap();
        assert!(front.is_empty());
        assert_eq!(body, content);
    }

    #[test]
    fn test_split_empty_body() {
        let content = "---\ntitle: Bare\n---";
        let (front, body) = split_front_matter(content).unwrap();
        assert_eq!(front.get("title").and_then(|v| v.as_str()), Some("Bare"));
        assert_eq!(body, "");
    }

    #[test]
    fn test_custom_fields_survive() {
        let content = "---\ntitle: T\ncustomField: 42\nnested:\n  a: 1\n---\nbody";
        let (front, _) = split_front_matter(content).unwrap();
        assert_eq!(front.get("customField").and_then(|v| v.as_i64()), Some(42));
        assert!(front.get("nested").map(|v| v.is_mapping()).unwrap_or(false));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(split_front_matter(content).is_err());
    }

    #[test]
    fn test_scalar_front_matter_rejected() {
        let content = "---\njust a string\n---\nbody";
        assert!(split_front_matter(content).is_err());
    }
}
