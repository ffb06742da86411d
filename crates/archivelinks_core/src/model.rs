use std::fmt;

/// A successful archival: the submitted link and where the archive lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveResult {
    pub link: String,
    pub archived: String,
}

impl ArchiveResult {
    pub fn new(link: impl Into<String>, archived: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            archived: archived.into(),
        }
    }
}

impl fmt::Display for ArchiveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.link, self.archived)
    }
}

/// One collected item, as seen by whoever consumes a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Archived(ArchiveResult),
    /// Rendered error message; it names the link and the failing phase.
    Failed(String),
}

/// Tally of a collection loop.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub expected: usize,
    pub archived: Vec<ArchiveResult>,
    pub failures: Vec<String>,
}

impl RunSummary {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Archived(result) => self.archived.push(result),
            Outcome::Failed(message) => self.failures.push(message),
        }
    }

    pub fn received(&self) -> usize {
        self.archived.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.received() >= self.expected
    }
}
