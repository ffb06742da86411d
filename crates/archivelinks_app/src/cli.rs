//! Command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use archive_logging::LogDestination;
use archivelinks_engine::{DEFAULT_ARCHIVE_URL, DEFAULT_REDDIT_URL};
use clap::Parser;

/// Archive a Reddit post and every link in its body.
#[derive(Parser, Debug)]
#[command(
    name = "archivelinks",
    version,
    about = "Archive a Reddit post and every link in it",
    long_about = "archivelinks is an automatic archiver for all links in a Reddit post as\n\
                  well as the post itself. The primary intention is to produce an archive\n\
                  of posts that are collecting information about something.\n\n\
                  The URL passed should be a full URL for a Reddit post."
)]
pub struct Cli {
    /// Full URL of the Reddit post
    pub source: String,

    /// archive.today mirror to submit to
    #[arg(long, env = "ARCHIVELINKS_ARCHIVE_URL", default_value = DEFAULT_ARCHIVE_URL)]
    pub archive_url: String,

    /// Where post listings are fetched from
    #[arg(long, env = "ARCHIVELINKS_REDDIT_URL", default_value = DEFAULT_REDDIT_URL)]
    pub reddit_url: String,

    /// Give up on the whole run after this many seconds (0 = no limit)
    #[arg(long, default_value = "0", env = "ARCHIVELINKS_TIMEOUT")]
    pub timeout: u64,

    /// Per-request timeout for archive submissions, in seconds
    #[arg(long, default_value = "120", env = "ARCHIVELINKS_REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    /// Also write logs to this file
    #[arg(long, env = "ARCHIVELINKS_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn run_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}
