mod cli;
mod error;
mod run;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use archive_logging::{archive_error, archive_info, archive_warn, level_from_verbosity};
use archivelinks_engine::{
    ArchiveSettings, ArchiveTodaySubmitter, CancelCause, CancelContext, DiscoverySettings,
    RedditLinkSource, RunSummary,
};
use clap::Parser;

use cli::Cli;
use error::RunError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    archive_logging::initialize(cli.log_destination(), level_from_verbosity(cli.verbose));
    archive_info!("archivelinks {} starting", env!("CARGO_PKG_VERSION"));

    let ctx = CancelContext::new();
    watch_interrupt(&ctx);
    if let Some(limit) = cli.run_timeout() {
        ctx.cancel_after(limit);
    }

    match start(&cli, &ctx).await {
        Ok(summary) => {
            archive_info!(
                "done: {} archived, {} failed",
                summary.archived.len(),
                summary.failures.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            archive_error!("run failed: {}", err);
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: &Cli, ctx: &CancelContext) -> Result<RunSummary, RunError> {
    let archiver = ArchiveTodaySubmitter::new(ArchiveSettings {
        base_url: cli.archive_url.clone(),
        request_timeout: Duration::from_secs(cli.request_timeout),
        ..ArchiveSettings::default()
    })
    .map_err(RunError::ArchiverSetup)?;
    let links = RedditLinkSource::new(DiscoverySettings {
        api_base: cli.reddit_url.clone(),
        ..DiscoverySettings::default()
    })
    .map_err(RunError::DiscoverySetup)?;

    run::run(
        &cli.source,
        &links,
        Arc::new(archiver),
        ctx,
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .await
}

/// Operator interrupt cancels the run once.
fn watch_interrupt(ctx: &CancelContext) {
    let ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            archive_warn!("interrupt received, cancelling");
            ctx.cancel(CancelCause::Interrupted);
        }
    });
}
