//! The sequential key trial loop.
//!
//! Keys are tried strictly in file order. For each candidate: install the
//! key, wait for the licensing service to settle, request online
//! activation, wait again, then confirm via the primary `/xpr` check and,
//! if that is inconclusive, the wmic license record fallback. The first
//! key for which either check reports a licensed host ends the run.
//!
//! Per-key failures (non-zero exit codes, timeouts, unrecognized output)
//! are logged and the loop continues with the next key; only a missing or
//! unreadable key file aborts the run.

use crate::command::{CommandResult, CommandRunner};
use crate::config::TrialConfig;
use crate::errors::TrialResult;
use crate::{keys, licensing};

/// Outcome of one trial run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialOutcome {
    /// A key activated the host; `line` is its 1-based line number in the
    /// key file.
    Activated { line: usize, key: String },
    /// Every candidate was tried without reaching a licensed state.
    Exhausted,
}

impl TrialOutcome {
    pub fn is_activated(&self) -> bool {
        matches!(self, TrialOutcome::Activated { .. })
    }
}

/// Drives the trial loop against an injected [`CommandRunner`].
pub struct TrialRunner<R: CommandRunner> {
    config: TrialConfig,
    commands: R,
}

impl<R: CommandRunner> TrialRunner<R> {
    pub fn new(config: TrialConfig, commands: R) -> Self {
        Self { config, commands }
    }

    /// Install a product key via `slmgr /ipk`.
    pub async fn install_key(&self, key: &str) -> CommandResult {
        self.commands
            .run(&licensing::install_key_argv(key), self.config.timeouts.install())
            .await
    }

    /// Request online activation via `slmgr /ato`.
    pub async fn attempt_activate(&self) -> CommandResult {
        self.commands
            .run(&licensing::activate_argv(), self.config.timeouts.activate())
            .await
    }

    /// Primary status check: `slmgr /xpr` phrase matching.
    ///
    /// Returns whether the host reports permanent activation, plus the
    /// raw report text for logging.
    pub async fn check_activation_primary(&self) -> (bool, String) {
        let result = self
            .commands
            .run(&licensing::expiry_status_argv(), self.config.timeouts.status())
            .await;
        if !result.success() {
            return (false, result.detail().to_string());
        }
        let activated = licensing::reports_permanent_activation(&result.stdout);
        (activated, result.stdout)
    }

    /// Fallback status check: wmic license records with `LicenseStatus=1`.
    pub async fn check_activation_fallback(&self) -> (bool, String) {
        let result = self
            .commands
            .run(&licensing::license_records_argv(), self.config.timeouts.status())
            .await;
        if !result.success() {
            return (false, result.detail().to_string());
        }
        let licensed = licensing::reports_licensed_record(&result.stdout);
        (licensed, result.stdout)
    }

    /// Give the licensing service time to settle after a mutating call.
    async fn settle(&self) {
        let delay = self.config.trial.post_action_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn log_step(step: &str, result: &CommandResult) {
        log::info!("  {step} exit code: {}", result.exit_code);
        if !result.stdout.is_empty() {
            log::debug!("  {step} stdout: {}", result.stdout);
        }
        if !result.stderr.is_empty() {
            log::warn!("  {step} stderr: {}", result.stderr);
        }
    }

    /// Try every key in the configured key file, in order, until one
    /// activates the host.
    ///
    /// Malformed lines are logged and skipped without touching the
    /// licensing service. A missing key file is fatal and returns an
    /// error before any command is run.
    pub async fn run_from_file(&self) -> TrialResult<TrialOutcome> {
        let lines = keys::read_key_lines(&self.config.trial.key_file)?;

        for (idx, raw) in lines.iter().enumerate() {
            let line = idx + 1;
            let key = match keys::normalize_key_line(raw) {
                Some(key) => key,
                None => {
                    log::info!("[{line}] empty or malformed line, skipped");
                    continue;
                }
            };

            log::info!("[{line}] trying key: {key}");

            let install = self.install_key(&key).await;
            Self::log_step("/ipk", &install);
            self.settle().await;

            let activate = self.attempt_activate().await;
            Self::log_step("/ato", &activate);
            self.settle().await;

            let (activated, detail) = self.check_activation_primary().await;
            log::info!("  /xpr check: {activated}");
            if activated {
                log::info!("[{line}] activation succeeded with key: {key}");
                return Ok(TrialOutcome::Activated { line, key });
            }
            log::debug!("  /xpr report: {detail}");

            let (licensed, detail) = self.check_activation_fallback().await;
            log::info!("  license record check: {licensed}");
            if licensed {
                log::info!("[{line}] activation succeeded with key: {key}");
                return Ok(TrialOutcome::Activated { line, key });
            }
            log::debug!("  license records: {detail}");

            log::info!("[{line}] key did not activate, continuing with the next one");
        }

        log::info!("all keys tried, activation not reached");
        Ok(TrialOutcome::Exhausted)
    }
}
