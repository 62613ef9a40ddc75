//! Exit codes and structured error reporting.

use serde::Serialize;

use crate::actions::DisposeError;

/// Process exit codes.
///
/// - 0: run completed (whether or not duplicates were found)
/// - 1: general error (bad input source, configuration, I/O)
/// - 3: a disposition action failed (unlink, wipe, command)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Run completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Acting on a duplicate failed; the run stopped.
    DispositionFailed = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RM000",
            Self::GeneralError => "RM001",
            Self::DispositionFailed => "RM003",
        }
    }

    /// Exit code for an error returned by `run_app`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.chain().any(|cause| cause.is::<DisposeError>()) {
            Self::DispositionFailed
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "RM003")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
        }
    }
}
