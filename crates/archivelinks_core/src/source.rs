use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceUrlError {
    #[error("parse: {0}")]
    Parse(#[from] url::ParseError),
    #[error("source URL not a Reddit URL")]
    NotReddit,
    #[error("source URL not for a specific post")]
    NotSpecificPost,
    #[error("source URL not for a post")]
    NotPost,
}

/// Turns any Reddit post URL into the URL of its JSON listing.
///
/// `https://old.reddit.com/r/rust/comments/abc123/some_title/?sort=new` becomes
/// `https://www.reddit.com/r/rust/comments/abc123.json`.
pub fn thread_json_url(source: &str) -> Result<Url, SourceUrlError> {
    let parsed = Url::parse(source)?;
    let host = parsed.host_str().unwrap_or_default();
    if !host.ends_with("reddit.com") {
        return Err(SourceUrlError::NotReddit);
    }

    let mut parts: Vec<&str> = parsed.path().trim_start_matches('/').split('/').collect();
    if parts.len() < 4 {
        return Err(SourceUrlError::NotSpecificPost);
    }
    if parts[2] != "comments" {
        return Err(SourceUrlError::NotPost);
    }
    let id = parts[3].trim_end_matches(".json");
    if id.is_empty() {
        return Err(SourceUrlError::NotSpecificPost);
    }
    let id = format!("{id}.json");
    parts[3] = &id;

    let mut url = Url::parse("https://www.reddit.com")?;
    url.set_path(&parts[..4].join("/"));
    Ok(url)
}
