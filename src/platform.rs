//! Host environment preconditions.
//!
//! Both preconditions are checked before any key is read: the host must be
//! Windows (the licensing utilities exist nowhere else) and the process
//! must be elevated (`slmgr /ipk` and `/ato` fail without it).

use std::time::Duration;

use crate::command::CommandRunner;

/// Whether the host OS carries the Software Licensing service at all.
pub fn is_supported_host() -> bool {
    cfg!(target_os = "windows")
}

/// Command line probing for elevation. `net session` exits with 0 only
/// when run from an elevated shell, and is harmless to call.
pub fn elevation_probe_argv() -> Vec<String> {
    vec!["net".to_string(), "session".to_string()]
}

/// Whether the process is running with administrative privileges.
pub async fn is_elevated<R: CommandRunner>(runner: &R, limit: Duration) -> bool {
    runner.run(&elevation_probe_argv(), limit).await.success()
}
