use std::future::Future;
use std::time::Duration;

use archive_logging::{archive_debug, archive_trace};
use reqwest::header::{HeaderMap, CONTENT_TYPE, REFRESH, USER_AGENT};
use scraper::{Html, Selector};
use url::Url;

use crate::{ArchiveServiceError, CancelContext, FailureKind};

pub const DEFAULT_ARCHIVE_URL: &str = "https://archive.today";

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Root of the archive.today mirror to submit to.
    pub base_url: String,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ARCHIVE_URL.to_string(),
            user_agent: concat!("archivelinks/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            redirect_limit: 5,
        }
    }
}

/// The archive operation for one URL.
///
/// Implementations must observe `ctx` for every blocking step they perform and
/// fail with [`FailureKind::Cancelled`] once it fires.
#[async_trait::async_trait]
pub trait Archiver: Send + Sync {
    async fn archive(&self, url: &Url, ctx: &CancelContext)
        -> Result<String, ArchiveServiceError>;
}

/// Submits pages to archive.today and reports where the snapshot lives.
#[derive(Debug, Clone)]
pub struct ArchiveTodaySubmitter {
    settings: ArchiveSettings,
    base: Url,
    client: reqwest::Client,
}

impl ArchiveTodaySubmitter {
    pub fn new(settings: ArchiveSettings) -> Result<Self, ArchiveServiceError> {
        let base = Url::parse(&settings.base_url).map_err(|err| {
            ArchiveServiceError::new(
                FailureKind::Network,
                format!("invalid archive url {}: {err}", settings.base_url),
            )
        })?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| ArchiveServiceError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ArchiveServiceError> {
        self.base
            .join(path)
            .map_err(|err| ArchiveServiceError::new(FailureKind::Network, err.to_string()))
    }

    /// The landing page carries a per-session `submitid` the submit form
    /// expects. Submission is still attempted without one.
    async fn submit_id(&self) -> Result<Option<String>, ArchiveServiceError> {
        let response = self
            .client
            .get(self.endpoint("/")?)
            .header(USER_AGENT, &self.settings.user_agent)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        if !response.status().is_success() {
            archive_debug!("archive landing page returned {}", response.status());
            return Ok(None);
        }
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(find_submit_id(&String::from_utf8_lossy(&body)))
    }

    async fn submit(&self, url: &Url) -> Result<String, ArchiveServiceError> {
        let submit_id = self.submit_id().await?;
        archive_trace!("submitting {} submitid={:?}", url, submit_id);

        let body = submit_form(url, submit_id.as_deref());
        let endpoint = self.endpoint("/submit/")?;
        let response = self
            .client
            .post(endpoint.clone())
            .header(USER_AGENT, &self.settings.user_agent)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArchiveServiceError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(location) = refresh_target(response.headers()) {
            return Ok(location);
        }
        let final_url = response.url();
        if final_url.path() != endpoint.path() {
            return Ok(final_url.to_string());
        }
        Err(ArchiveServiceError::new(
            FailureKind::NoLocation,
            format!("submit for {url} returned neither a refresh nor a redirect"),
        ))
    }
}

#[async_trait::async_trait]
impl Archiver for ArchiveTodaySubmitter {
    async fn archive(
        &self,
        url: &Url,
        ctx: &CancelContext,
    ) -> Result<String, ArchiveServiceError> {
        until_cancelled(ctx, self.submit(url)).await
    }
}

async fn until_cancelled<T, F>(ctx: &CancelContext, work: F) -> Result<T, ArchiveServiceError>
where
    F: Future<Output = Result<T, ArchiveServiceError>>,
{
    tokio::select! {
        biased;
        cause = ctx.cancelled() => Err(ArchiveServiceError::cancelled(cause)),
        result = work => result,
    }
}

/// The serializer is not `Send`, so it must not live across an await.
fn submit_form(url: &Url, submit_id: Option<&str>) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());
    form.append_pair("url", url.as_str()).append_pair("anyway", "1");
    if let Some(id) = submit_id {
        form.append_pair("submitid", id);
    }
    form.finish()
}

fn find_submit_id(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="submitid"]"#).ok()?;
    document
        .select(&selector)
        .filter_map(|input| input.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

/// Parses `Refresh: 0;url=https://archive.ph/abcd`.
fn refresh_target(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REFRESH)?.to_str().ok()?;
    let (_, rest) = value.split_once(';')?;
    let rest = rest.trim();
    let target = rest
        .strip_prefix("url=")
        .or_else(|| rest.strip_prefix("URL="))?
        .trim_matches(&['\'', '"', ' '][..]);
    if target.is_empty() {
        None
    } else {
        Some(target.to_string())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ArchiveServiceError {
    if err.is_timeout() {
        return ArchiveServiceError::new(FailureKind::Timeout, err.to_string());
    }
    ArchiveServiceError::new(FailureKind::Network, err.to_string())
}
