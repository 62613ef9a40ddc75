//! rmdups - remove files that duplicate a kept collection
//!
//! Files from the delete sources are compared byte-for-byte with same-size
//! files from the keep sources. A delete candidate equal to some kept file
//! is a duplicate and gets the configured disposition: printed, passed to
//! a command, deleted, or wiped and deleted. A candidate that is the same
//! physical file as a kept file (a hard link, or the same path listed
//! twice) is never disposed of.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod scanner;

use std::io;

use anyhow::{bail, Context, Result};
use bytesize::ByteSize;

use crate::actions::{ActionCounts, Disposer};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{
    index_records, AcceptAll, DuplicateResolver, IndexFilter, KeepSizeFilter, LoadStats,
    ResolveSummary, SizeIndex,
};
use crate::error::ExitCode;
use crate::scanner::{IndexSource, Walker};

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns an error if configuration or an input source cannot be loaded,
/// or if a disposition action fails. A disposition failure stops the run
/// without a summary.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    log::debug!("{:?}", config);

    let (keep, delete) = load_indexes(&cli)?;

    let resolver = DuplicateResolver::new(config.comparer());
    let mut disposer = Disposer::new(
        cli.disposition(config.wipe_chunk_size),
        io::stdout().lock(),
    );
    let summary = resolver
        .resolve(&keep, &delete, &mut disposer)
        .context("stopped while disposing of a duplicate")?;

    log_summary(&summary, disposer.counts());
    Ok(ExitCode::Success)
}

/// Build the keep and delete indexes from the sources named on `cli`.
///
/// Delete sources load first; keep files are then only indexed when some
/// delete candidate has the same size.
///
/// # Errors
///
/// Returns an error if stdin is named more than once or any source cannot
/// be opened. Unusable entries inside a source are skipped with a warning.
pub fn load_indexes(cli: &Cli) -> Result<(SizeIndex, SizeIndex)> {
    if cli.stdin_reused() {
        bail!("stdin ('-') can be used as an index source only once");
    }

    let mut delete = SizeIndex::new("DeleteIndex");
    load_sources(&mut delete, &cli.del_index, &cli.del_dir, &AcceptAll)?;
    log::info!(
        "delete index done: {} files in {} sizes, {}",
        delete.len(),
        delete.bucket_count(),
        ByteSize(delete.total_bytes())
    );

    let mut keep = SizeIndex::new("KeepIndex");
    load_sources(
        &mut keep,
        &cli.keep_index,
        &cli.keep_dir,
        &KeepSizeFilter::new(&delete),
    )?;
    log::info!(
        "keep index done: {} files in {} sizes",
        keep.len(),
        keep.bucket_count()
    );

    Ok((keep, delete))
}

fn load_sources<F: IndexFilter + ?Sized>(
    index: &mut SizeIndex,
    index_files: &[IndexSource],
    dirs: &[std::path::PathBuf],
    filter: &F,
) -> Result<()> {
    for source in index_files {
        log::info!("reading {} from index {}", index.label(), source);
        let reader = source
            .open()
            .with_context(|| format!("cannot read index {}", source))?;
        let stats = index_records(index, reader, filter);
        log_load(index, &source.to_string(), stats);
    }
    for dir in dirs {
        log::info!("reading {} from directory {}", index.label(), dir.display());
        let walker =
            Walker::new(dir).with_context(|| format!("cannot scan directory {}", dir.display()))?;
        let stats = index_records(index, walker.walk(), filter);
        log_load(index, &dir.display().to_string(), stats);
    }
    Ok(())
}

fn log_load(index: &SizeIndex, source: &str, stats: LoadStats) {
    log::debug!(
        "{} from {}: indexed={} filtered={} skipped={}",
        index.label(),
        source,
        stats.indexed,
        stats.filtered,
        stats.skipped
    );
}

fn log_summary(summary: &ResolveSummary, counts: ActionCounts) {
    let tallies = &summary.comparisons;
    log::info!(
        "Can delete files={}, bytes={} ({})",
        summary.duplicate_files,
        summary.duplicate_bytes,
        ByteSize(summary.duplicate_bytes)
    );
    log::info!(
        "candidates={} refused_same_file={}",
        summary.candidates,
        summary.refused_same_file
    );
    log::info!(
        "cache_hit_same={} cache_hit_diff={} cache_hit_same_but_short={}",
        tallies.equal_from_cache,
        tallies.unequal_from_cache,
        tallies.prefix_agreed
    );
    log::info!(
        "full_read_same={} full_read_diff={} anomalies={}",
        tallies.equal_from_full_read,
        tallies.unequal_from_full_read,
        tallies.anomalies
    );
    log::info!("actions: {}", counts);
}
