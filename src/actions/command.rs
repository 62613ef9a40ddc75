//! External commands run on each duplicate.
//!
//! A template such as `mv -n {} /tmp/dups/` is split on whitespace. Every
//! `{}` inside an argument is replaced by the duplicate's path; when no
//! argument contains `{}`, the path is appended as the last argument. The
//! program runs without a shell and inherits stdio.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};
use std::str::FromStr;

use thiserror::Error;

const PLACEHOLDER: &str = "{}";

/// Errors from running a command template.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The program could not be started.
    #[error("cannot execute command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and reported failure.
    #[error("command '{command}' failed with {status}")]
    Failed { command: String, status: ExitStatus },
}

/// A parsed `--dup-cmd` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    words: Vec<String>,
}

impl CommandTemplate {
    /// The template words, program first.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Program name plus arguments for `path`.
    #[must_use]
    pub fn argv(&self, path: &Path) -> Vec<OsString> {
        let mut substituted = false;
        let mut argv: Vec<OsString> = self
            .words
            .iter()
            .map(|word| match substitute(word, path.as_os_str()) {
                Some(arg) => {
                    substituted = true;
                    arg
                }
                None => OsString::from(word),
            })
            .collect();
        if !substituted {
            argv.push(path.as_os_str().to_os_string());
        }
        argv
    }

    /// Run the command for `path` and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns `Spawn` if the program cannot be started and `Failed` if it
    /// exits unsuccessfully.
    pub fn run(&self, path: &Path) -> Result<(), CommandError> {
        let argv = self.argv(path);
        let display = display_argv(&argv);
        log::info!("execute command: {}", display);

        let mut argv = argv.into_iter();
        let program = argv.next().unwrap_or_default();
        let status = Command::new(program)
            .args(argv)
            .status()
            .map_err(|source| CommandError::Spawn {
                command: display.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                command: display,
                status,
            })
        }
    }
}

impl FromStr for CommandTemplate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = s.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Err("Command cannot be empty".to_string());
        }
        Ok(Self { words })
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.words.join(" "))
    }
}

/// `word` with each placeholder replaced by `path`, or `None` if it has none.
fn substitute(word: &str, path: &OsStr) -> Option<OsString> {
    if !word.contains(PLACEHOLDER) {
        return None;
    }
    let mut arg = OsString::new();
    for (i, piece) in word.split(PLACEHOLDER).enumerate() {
        if i > 0 {
            arg.push(path);
        }
        arg.push(piece);
    }
    Some(arg)
}

fn display_argv(argv: &[OsString]) -> String {
    let quoted: Vec<String> = argv
        .iter()
        .map(|a| format!("'{}'", a.to_string_lossy()))
        .collect();
    format!("[{}]", quoted.join(", "))
}
