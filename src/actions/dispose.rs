//! Applying the configured disposition to each confirmed duplicate.
//!
//! Actions always run in this order, each one only if enabled:
//!
//! 1. print the path followed by LF
//! 2. print the path followed by NUL
//! 3. run every command template, in the order given
//! 4. wipe (overwrite with zeros, then unlink)
//! 5. delete (unlink), skipped when the wipe already removed the file
//!
//! With no action enabled, an informational "can delete" line is logged
//! instead. The first failing action aborts the run.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::command::{CommandError, CommandTemplate};
use super::delete::{unlink, wipe_file, DeleteError};
use crate::duplicates::{Duplicate, DuplicateHandler};

/// Default chunk size for overwriting files with zeros.
pub const WIPE_CHUNK_SIZE: usize = 64 * 1024;

/// Fatal disposition failures.
#[derive(Debug, Error)]
pub enum DisposeError {
    /// Wiping or unlinking failed.
    #[error(transparent)]
    Delete(#[from] DeleteError),

    /// A command could not run or exited unsuccessfully.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Writing a path to the output failed.
    #[error("cannot write duplicate path to output: {0}")]
    Output(#[source] io::Error),
}

/// Which actions to apply to each duplicate.
#[derive(Debug, Clone)]
pub struct DispositionConfig {
    /// Print the path terminated by LF
    pub print_lf: bool,
    /// Print the path terminated by NUL
    pub print_nul: bool,
    /// Commands to run for the path
    pub commands: Vec<CommandTemplate>,
    /// Overwrite with zeros, then unlink
    pub wipe: bool,
    /// Unlink
    pub delete: bool,
    /// Write size used while wiping
    pub wipe_chunk_size: usize,
}

impl Default for DispositionConfig {
    fn default() -> Self {
        Self {
            print_lf: false,
            print_nul: false,
            commands: Vec::new(),
            wipe: false,
            delete: false,
            wipe_chunk_size: WIPE_CHUNK_SIZE,
        }
    }
}

impl DispositionConfig {
    /// Whether any action besides the default report is enabled.
    #[must_use]
    pub fn has_actions(&self) -> bool {
        self.print_lf || self.print_nul || !self.commands.is_empty() || self.wipe || self.delete
    }

    /// Whether duplicates are removed from disk.
    #[must_use]
    pub fn removes_files(&self) -> bool {
        self.wipe || self.delete
    }
}

/// One action carried out on a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Path printed with an LF terminator
    PrintedLf,
    /// Path printed with a NUL terminator
    PrintedNul,
    /// A command ran successfully
    CommandRun,
    /// Contents zeroed and file unlinked
    WipedAndDeleted,
    /// File unlinked
    Deleted,
    /// Only the informational line was logged
    Reported,
}

/// Record of what was done with one duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// The duplicate's path
    pub path: PathBuf,
    /// The kept file it matched
    pub kept: PathBuf,
    /// Bytes the duplicate occupies
    pub size: u64,
    /// Actions in the order they ran
    pub actions: Vec<Action>,
}

/// Per-action counters over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    /// Paths written to the output, counting LF and NUL lines separately
    pub printed: usize,
    /// Successful command invocations
    pub commands_run: usize,
    /// Files overwritten with zeros and unlinked
    pub wiped: usize,
    /// Files unlinked without a wipe
    pub deleted: usize,
    /// Duplicates only logged as deletable
    pub reported: usize,
}

impl fmt::Display for ActionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "printed={} commands_run={} wiped={} deleted={} reported={}",
            self.printed, self.commands_run, self.wiped, self.deleted, self.reported
        )
    }
}

/// Applies a [`DispositionConfig`] to duplicates, printing to `out`.
pub struct Disposer<W: Write> {
    config: DispositionConfig,
    out: W,
    counts: ActionCounts,
}

impl<W: Write> Disposer<W> {
    /// Create a disposer writing printed paths to `out`.
    pub fn new(config: DispositionConfig, out: W) -> Self {
        Self {
            config,
            out,
            counts: ActionCounts::default(),
        }
    }

    /// Counters so far.
    pub fn counts(&self) -> ActionCounts {
        self.counts
    }

    /// Consume the disposer, returning the output writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Apply every enabled action to `duplicate`.
    ///
    /// # Errors
    ///
    /// Returns the first action failure. Actions after it do not run.
    pub fn dispose(&mut self, duplicate: &Duplicate) -> Result<Disposition, DisposeError> {
        let path = duplicate.candidate.path();
        let kept = duplicate.kept.path();
        let size = duplicate.size();
        let mut actions = Vec::new();

        if self.config.print_lf {
            self.print(path, b'\n')?;
            actions.push(Action::PrintedLf);
        }
        if self.config.print_nul {
            self.print(path, b'\0')?;
            actions.push(Action::PrintedNul);
        }
        for command in &self.config.commands {
            command.run(path)?;
            self.counts.commands_run += 1;
            actions.push(Action::CommandRun);
        }
        if self.config.wipe {
            log::info!(
                "wiping and deleting {} bytes '{}' it is same as '{}'",
                size,
                path.display(),
                kept.display()
            );
            wipe_file(path, size, self.config.wipe_chunk_size)?;
            self.counts.wiped += 1;
            actions.push(Action::WipedAndDeleted);
        } else if self.config.delete {
            log::info!(
                "deleting {} bytes '{}' it is same as '{}'",
                size,
                path.display(),
                kept.display()
            );
            unlink(path)?;
            self.counts.deleted += 1;
            actions.push(Action::Deleted);
        }

        if actions.is_empty() {
            log::info!(
                "can delete {} bytes '{}' it is same as '{}'",
                size,
                path.display(),
                kept.display()
            );
            self.counts.reported += 1;
            actions.push(Action::Reported);
        }

        Ok(Disposition {
            path: path.to_path_buf(),
            kept: kept.to_path_buf(),
            size,
            actions,
        })
    }

    fn print(&mut self, path: &Path, terminator: u8) -> Result<(), DisposeError> {
        self.out
            .write_all(&path_bytes(path))
            .and_then(|()| self.out.write_all(&[terminator]))
            .and_then(|()| self.out.flush())
            .map_err(DisposeError::Output)?;
        self.counts.printed += 1;
        Ok(())
    }
}

impl<W: Write> DuplicateHandler for Disposer<W> {
    type Error = DisposeError;

    fn handle(&mut self, duplicate: &Duplicate) -> Result<(), Self::Error> {
        let disposition = self.dispose(duplicate)?;
        log::debug!(
            "disposed {} with {:?}",
            disposition.path.display(),
            disposition.actions
        );
        Ok(())
    }
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    std::borrow::Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> std::borrow::Cow<'_, [u8]> {
    match path.to_string_lossy() {
        std::borrow::Cow::Borrowed(s) => std::borrow::Cow::Borrowed(s.as_bytes()),
        std::borrow::Cow::Owned(s) => std::borrow::Cow::Owned(s.into_bytes()),
    }
}
