//! Command-line interface definitions for rmdups.
//!
//! All options are flat; there are no subcommands. Sources say where files
//! come from, `--dup-*` flags say what to do with the duplicates found.
//!
//! # Example
//!
//! ```bash
//! # Report files under ~/inbox that already exist under ~/archive
//! rmdups --keep-dir ~/archive --del-dir ~/inbox
//!
//! # Delete them, reading the keep list from a prepared index file
//! find ~/archive -type f > keep.lst
//! rmdups --keep-index keep.lst --del-dir ~/inbox --dup-delete
//!
//! # Hand the duplicates to another tool
//! rmdups --keep-dir ~/archive --del-dir ~/inbox --dup-print0 | xargs -0 ls -l
//! rmdups --keep-dir ~/archive --del-dir ~/inbox --dup-cmd 'mv -n {} /tmp/dups/'
//! ```

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

use crate::actions::{CommandTemplate, DispositionConfig};
use crate::scanner::IndexSource;

/// Find files that duplicate a kept collection and dispose of them.
///
/// Every file from the delete sources is compared byte-for-byte against
/// files of the same size from the keep sources. Files that match are
/// duplicates; what happens to them is chosen with the --dup-* options.
/// Without any of those, duplicates are only reported in the log.
#[derive(Debug, Parser)]
#[command(name = "rmdups")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("delete_sources")
        .args(["del_index", "del_dir"])
        .required(true)
        .multiple(true)
))]
pub struct Cli {
    /// Index file listing files to keep, one path per line ("-" for stdin)
    #[arg(long = "keep-index", value_name = "FILE")]
    pub keep_index: Vec<IndexSource>,

    /// Directory whose files are kept (scanned recursively)
    #[arg(long = "keep-dir", value_name = "DIR")]
    pub keep_dir: Vec<PathBuf>,

    /// Index file listing candidate duplicates, one path per line ("-" for stdin)
    #[arg(long = "del-index", value_name = "FILE")]
    pub del_index: Vec<IndexSource>,

    /// Directory whose files are candidate duplicates (scanned recursively)
    #[arg(long = "del-dir", value_name = "DIR")]
    pub del_dir: Vec<PathBuf>,

    /// Print duplicate paths to stdout terminated with LF
    #[arg(long)]
    pub dup_print: bool,

    /// Print duplicate paths to stdout terminated with NUL
    #[arg(long)]
    pub dup_print0: bool,

    /// Command to run for each duplicate (can be given multiple times)
    ///
    /// Split on whitespace. Every {} is replaced by the duplicate's path;
    /// without {} the path is appended. A non-zero exit stops the run.
    #[arg(long = "dup-cmd", value_name = "CMD")]
    pub dup_cmd: Vec<CommandTemplate>,

    /// Delete duplicate files (redundant with --dup-wipe, which already deletes them)
    #[arg(long)]
    pub dup_delete: bool,

    /// Overwrite duplicate files with zeros, then delete them
    #[arg(long)]
    pub dup_wipe: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file for tuning options (TOML)
    #[arg(long, value_name = "FILE", env = "RMDUPS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output errors as JSON to stderr
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    /// Disposition actions selected on the command line.
    #[must_use]
    pub fn disposition(&self, wipe_chunk_size: usize) -> DispositionConfig {
        DispositionConfig {
            print_lf: self.dup_print,
            print_nul: self.dup_print0,
            commands: self.dup_cmd.clone(),
            wipe: self.dup_wipe,
            delete: self.dup_delete,
            wipe_chunk_size,
        }
    }

    /// Whether stdin is named more than once across index sources.
    #[must_use]
    pub fn stdin_reused(&self) -> bool {
        self.keep_index
            .iter()
            .chain(&self.del_index)
            .filter(|s| **s == IndexSource::Stdin)
            .count()
            > 1
    }
}
