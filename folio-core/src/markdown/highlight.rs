//! Code block highlighting via syntect.

use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME: OnceLock<Theme> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme() -> &'static Theme {
    THEME.get_or_init(|| {
        let theme_set = ThemeSet::load_defaults();
        theme_set
            .themes
            .get("InspiredGitHub")
            .or_else(|| theme_set.themes.get("base16-ocean.light"))
            .unwrap()
            .clone()
    })
}

/// Highlight a fenced code block by language token.
///
/// Unknown languages fall back to plain text; a highlighting failure falls
/// back to the escaped original block instead of failing the conversion.
pub fn highlight_code(code: &str, lang: &str) -> String {
    let syntaxes = syntax_set();
    let syntax = syntaxes
        .find_syntax_by_token(lang)
        .or_else(|| syntaxes.find_syntax_by_extension(lang))
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());

    match highlighted_html_for_string(code, syntaxes, syntax, theme()) {
        Ok(html) => html,
        Err(err) => {
            tracing::warn!(lang, "highlighting failed: {err}");
            format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                lang,
                crate::markdown::html_escape(code)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_known_language() {
        let html = highlight_code("fn main() {}\n", "rust");
        assert!(html.contains("<pre"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain() {
        let html = highlight_code("whatever text\n", "no-such-language");
        assert!(html.contains("whatever text"));
    }

    #[test]
    fn test_output_is_deterministic() {
        let a = highlight_code("let x = 1;\n", "rust");
        let b = highlight_code("let x = 1;\n", "rust");
        assert_eq!(a, b);
    }
}
