use std::sync::OnceLock;

use regex::Regex;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"\[([^\]]*)\]\(\s*<?([^\s)<>]+)>?(?:\s+"[^"]*")?\s*\)"#)
            .expect("markdown link pattern is valid")
    })
}

/// Extracts the targets of inline markdown links (`[text](target)`), in
/// document order.
///
/// Reddit stores post bodies with HTML entities escaped and markdown
/// punctuation backslash-escaped, so both are undone on each target.
pub fn extract_markdown_links(markdown: &str) -> Vec<String> {
    link_pattern()
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(2))
        .map(|target| unescape(target.as_str()))
        .filter(|target| !target.is_empty())
        .collect()
}

fn unescape(target: &str) -> String {
    let decoded = target
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"");

    let mut out = String::with_capacity(decoded.len());
    let mut chars = decoded.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.peek().copied() {
                if next.is_ascii_punctuation() {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn links_are_returned_in_order() {
        let body = "See [first](http://a.example) and [second](http://b.example/x).";
        assert_eq!(
            extract_markdown_links(body),
            vec!["http://a.example".to_string(), "http://b.example/x".to_string()]
        );
    }

    #[test]
    fn titles_and_angle_brackets_are_ignored() {
        let body = r#"[t](<http://a.example/y> "title") [u](http://b.example "other")"#;
        assert_eq!(
            extract_markdown_links(body),
            vec!["http://a.example/y".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn reddit_escapes_are_undone() {
        let body = r"[q](https://a.example/some\_path?x=1&amp;y=2)";
        assert_eq!(
            extract_markdown_links(body),
            vec!["https://a.example/some_path?x=1&y=2".to_string()]
        );
    }

    #[test]
    fn plain_brackets_are_not_links() {
        assert!(extract_markdown_links("[not a link] (nor this)").is_empty());
    }

    #[test]
    fn duplicates_are_kept() {
        let body = "[a](http://a.example) [a again](http://a.example)";
        assert_eq!(extract_markdown_links(body).len(), 2);
    }
}
