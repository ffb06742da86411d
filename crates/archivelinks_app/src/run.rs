use std::io::Write;
use std::sync::Arc;

use archive_logging::{archive_info, archive_warn};
use archivelinks_engine::{
    collect, Archiver, CancelContext, Dispatcher, LinkSource, Outcome, RunSummary,
};

use crate::error::RunError;

/// Archives `source` and every link discovered in it.
///
/// Successes are written to `out` as `link -> archived`, failures to `err`.
/// Nothing is submitted when discovery fails.
pub async fn run<O, E>(
    source: &str,
    links: &dyn LinkSource,
    archiver: Arc<dyn Archiver>,
    ctx: &CancelContext,
    out: &mut O,
    err: &mut E,
) -> Result<RunSummary, RunError>
where
    O: Write,
    E: Write,
{
    let discovered = links
        .discover(source, ctx)
        .await
        .map_err(RunError::Discovery)?;
    archive_info!("archiving {} and {} linked pages", source, discovered.len());

    let dispatcher = Dispatcher::new(archiver);
    dispatcher.submit(ctx, source);
    for link in &discovered {
        dispatcher.submit(ctx, link.as_str());
    }

    let summary = collect(&dispatcher, ctx, discovered.len() + 1, |outcome| {
        report(outcome, &mut *out, &mut *err)
    })
    .await?;
    Ok(summary)
}

fn report(outcome: &Outcome, out: &mut impl Write, err: &mut impl Write) {
    let written = match outcome {
        Outcome::Archived(result) => writeln!(out, "{result}"),
        Outcome::Failed(message) => writeln!(err, "{message}"),
    };
    if let Err(e) = written {
        archive_warn!("could not write outcome: {}", e);
    }
}
