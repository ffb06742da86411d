#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use archivelinks_engine::{
    ArchiveServiceError, Archiver, CancelContext, DiscoveryError, FailureKind, LinkSource,
};
use url::Url;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(archive_logging::initialize_for_tests);
}

/// Archiver whose answers are fixed per link. Unknown links archive to
/// `http://archive.example/<host><path>`.
#[derive(Default)]
pub struct ScriptedArchiver {
    failures: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedArchiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, url: &str, message: &str) -> Self {
        self.failures.insert(normalize(url), message.to_string());
        self
    }

    pub fn delayed(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(normalize(url), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

fn normalize(url: &str) -> String {
    Url::parse(url).unwrap().to_string()
}

#[async_trait::async_trait]
impl Archiver for ScriptedArchiver {
    async fn archive(
        &self,
        url: &Url,
        ctx: &CancelContext,
    ) -> Result<String, ArchiveServiceError> {
        let key = url.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if let Some(delay) = self.delays.get(&key) {
            tokio::select! {
                cause = ctx.cancelled() => {
                    return Err(ArchiveServiceError::new(FailureKind::Cancelled, cause.to_string()));
                }
                _ = tokio::time::sleep(*delay) => {}
            }
        }

        match self.failures.get(&key) {
            Some(message) => Err(ArchiveServiceError::new(FailureKind::Rejected, message.clone())),
            None => Ok(format!(
                "http://archive.example/{}{}",
                url.host_str().unwrap_or_default(),
                url.path().trim_end_matches('/')
            )),
        }
    }
}

/// Archiver that never finishes on its own; it only returns once cancelled.
pub struct StalledArchiver;

#[async_trait::async_trait]
impl Archiver for StalledArchiver {
    async fn archive(
        &self,
        _url: &Url,
        ctx: &CancelContext,
    ) -> Result<String, ArchiveServiceError> {
        let cause = ctx.cancelled().await;
        Err(ArchiveServiceError::new(FailureKind::Cancelled, cause.to_string()))
    }
}

/// Link source returning a fixed list, or failing.
pub struct FixedLinks(pub Result<Vec<String>, &'static str>);

#[async_trait::async_trait]
impl LinkSource for FixedLinks {
    async fn discover(
        &self,
        _source: &str,
        _ctx: &CancelContext,
    ) -> Result<Vec<String>, DiscoveryError> {
        self.0.clone().map_err(DiscoveryError::MissingData)
    }
}
