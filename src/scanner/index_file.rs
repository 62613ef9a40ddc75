//! Newline-delimited path lists ("index files").
//!
//! An index file lists one path per line. Trailing whitespace (including the
//! CR of CRLF line endings) is stripped, blank lines are skipped, and every
//! remaining path is stat'ed following symlinks. Lines are read as raw bytes
//! so non-UTF-8 paths survive on Unix.
//!
//! The special source `-` reads the list from standard input.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;

use super::{FileRecord, ScanError};

/// Where an index is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexSource {
    /// Standard input (`-` on the command line)
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl IndexSource {
    /// Open the source for line-by-line reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the index file cannot be opened.
    pub fn open(&self) -> Result<IndexFileReader<Box<dyn BufRead>>, ScanError> {
        let reader: Box<dyn BufRead> = match self {
            Self::Stdin => Box::new(io::stdin().lock()),
            Self::File(path) => {
                let file = File::open(path).map_err(|e| ScanError::from_io(path, e))?;
                Box::new(BufReader::new(file))
            }
        };
        Ok(IndexFileReader::new(reader, self.to_string()))
    }
}

impl FromStr for IndexSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("Index path cannot be empty".to_string()),
            "-" => Ok(Self::Stdin),
            path => Ok(Self::File(PathBuf::from(path))),
        }
    }
}

impl fmt::Display for IndexSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => write!(f, "STDIN"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Iterator over the records listed by an index.
///
/// Yields one item per non-blank line. A read failure on the underlying
/// stream is yielded once as an error and ends the iteration.
pub struct IndexFileReader<R> {
    lines: io::Split<R>,
    label: String,
    finished: bool,
}

impl<R: BufRead> IndexFileReader<R> {
    /// Wrap a buffered reader. `label` names the source in error messages.
    pub fn new(reader: R, label: impl Into<String>) -> Self {
        Self {
            lines: reader.split(b'\n'),
            label: label.into(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for IndexFileReader<R> {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(ScanError::Io {
                        path: PathBuf::from(&self.label),
                        source: e,
                    }));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            let trimmed = line.trim_ascii_end();
            if trimmed.is_empty() {
                continue;
            }
            return Some(FileRecord::stat(bytes_to_path(trimmed)));
        }
        None
    }
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
