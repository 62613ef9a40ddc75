//! What happens to duplicates once they are found.
//!
//! - [`dispose`]: applies the configured actions in a fixed order
//! - [`command`]: `--dup-cmd` templates
//! - [`delete`]: unlink and wipe primitives
//!
//! ```no_run
//! use rmdups::actions::{DispositionConfig, Disposer};
//!
//! let config = DispositionConfig {
//!     print_nul: true,
//!     ..DispositionConfig::default()
//! };
//! let disposer = Disposer::new(config, std::io::stdout().lock());
//! # let _ = disposer;
//! ```

pub mod command;
pub mod delete;
pub mod dispose;

pub use command::{CommandError, CommandTemplate};
pub use delete::{unlink, wipe_file, DeleteError};
pub use dispose::{
    Action, ActionCounts, DisposeError, Disposer, Disposition, DispositionConfig, WIPE_CHUNK_SIZE,
};
