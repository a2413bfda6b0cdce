//! keytrial - batch product key trial runner for the Windows Software
//! Licensing service.
//!
//! Reads candidate product keys from a text file (one key per line) and
//! tries each in order: install via `slmgr.vbs /ipk`, request online
//! activation via `/ato`, then confirm the result with `slmgr /xpr` and,
//! independently, a `wmic SoftwareLicensingProduct` record query. The
//! first key that leaves the host permanently activated ends the run.
//!
//! The whole run is sequential; external commands are bounded by
//! per-command timeouts and a failing or hanging command only fails that
//! key, never the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use keytrial::command::SystemRunner;
//! use keytrial::config::TrialConfig;
//! use keytrial::runner::TrialRunner;
//!
//! let config = TrialConfig::load()?;
//! let runner = TrialRunner::new(config, SystemRunner);
//! let outcome = runner.run_from_file().await?;
//! ```

pub mod command;
pub mod config;
pub mod errors;
pub mod keys;
pub mod licensing;
pub mod platform;
pub mod runner;

pub use command::{CommandResult, CommandRunner, SystemRunner};
pub use config::TrialConfig;
pub use errors::{TrialError, TrialResult};
pub use runner::{TrialOutcome, TrialRunner};
