use std::time::Duration;

use archive_logging::archive_debug;
use archivelinks_core::{extract_markdown_links, thread_json_url, SourceUrlError};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use url::Url;

use crate::{CancelContext, DiscoveryError};

pub const DEFAULT_REDDIT_URL: &str = "https://www.reddit.com";

#[derive(Debug, Clone)]
pub struct DiscoverySettings {
    /// Host the post listing is fetched from; the post path is kept.
    pub api_base: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_REDDIT_URL.to_string(),
            user_agent: concat!("archivelinks/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolves a source identifier into the ordered list of links to archive.
#[async_trait::async_trait]
pub trait LinkSource: Send + Sync {
    async fn discover(&self, source: &str, ctx: &CancelContext)
        -> Result<Vec<String>, DiscoveryError>;
}

/// Reads the body of a Reddit post and returns the markdown links in it.
#[derive(Debug, Clone)]
pub struct RedditLinkSource {
    settings: DiscoverySettings,
    client: reqwest::Client,
}

impl RedditLinkSource {
    pub fn new(settings: DiscoverySettings) -> Result<Self, DiscoveryError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(DiscoveryError::Client)?;
        Ok(Self { settings, client })
    }

    fn listing_url(&self, source: &str) -> Result<Url, DiscoveryError> {
        let listing = thread_json_url(source)?;
        let base = Url::parse(&self.settings.api_base).map_err(SourceUrlError::from)?;
        let url = base.join(listing.path()).map_err(SourceUrlError::from)?;
        Ok(url)
    }

    async fn fetch_selftext(&self, listing: Url) -> Result<String, DiscoveryError> {
        let response = self
            .client
            .get(listing)
            .header(USER_AGENT, &self.settings.user_agent)
            .send()
            .await
            .map_err(DiscoveryError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(DiscoveryError::Read)?;
        selftext_from_listing(&body)
    }
}

#[async_trait::async_trait]
impl LinkSource for RedditLinkSource {
    async fn discover(
        &self,
        source: &str,
        ctx: &CancelContext,
    ) -> Result<Vec<String>, DiscoveryError> {
        let listing = self.listing_url(source)?;
        archive_debug!("fetching post listing {}", listing);

        let selftext = tokio::select! {
            biased;
            cause = ctx.cancelled() => return Err(DiscoveryError::Cancelled(cause)),
            selftext = self.fetch_selftext(listing) => selftext?,
        };

        let links = extract_markdown_links(&selftext);
        archive_debug!("post {} contains {} links", source, links.len());
        Ok(links)
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    selftext: Option<String>,
}

/// A post's JSON is an array of listings: the post itself, then its comments.
fn selftext_from_listing(body: &[u8]) -> Result<String, DiscoveryError> {
    let listings: Vec<Listing> = serde_json::from_slice(body)?;
    let post_listing = listings
        .into_iter()
        .next()
        .ok_or(DiscoveryError::MissingData("listing"))?;
    let post = post_listing
        .data
        .children
        .into_iter()
        .next()
        .ok_or(DiscoveryError::MissingData("post"))?;
    post.data
        .selftext
        .ok_or(DiscoveryError::MissingData("selftext"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selftext_is_taken_from_first_child() {
        let body = br#"[{"data":{"children":[{"data":{"selftext":"hi [a](http://a.example)"}}]}},{"data":{"children":[]}}]"#;
        assert_eq!(
            selftext_from_listing(body).unwrap(),
            "hi [a](http://a.example)"
        );
    }

    #[test]
    fn missing_pieces_are_reported() {
        assert!(matches!(
            selftext_from_listing(b"[]"),
            Err(DiscoveryError::MissingData("listing"))
        ));
        assert!(matches!(
            selftext_from_listing(br#"[{"data":{"children":[]}}]"#),
            Err(DiscoveryError::MissingData("post"))
        ));
        assert!(matches!(
            selftext_from_listing(br#"[{"data":{"children":[{"data":{}}]}}]"#),
            Err(DiscoveryError::MissingData("selftext"))
        ));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            selftext_from_listing(b"<html>"),
            Err(DiscoveryError::Decode(_))
        ));
    }

    #[test]
    fn listing_is_fetched_from_configured_base() {
        let source = RedditLinkSource::new(DiscoverySettings {
            api_base: "http://127.0.0.1:9999".to_string(),
            ..DiscoverySettings::default()
        })
        .unwrap();
        let url = source
            .listing_url("https://www.reddit.com/r/rust/comments/abc/title/")
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9999/r/rust/comments/abc.json");
    }
}
