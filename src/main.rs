use std::process::ExitCode;

use keytrial::command::SystemRunner;
use keytrial::config::{LoggingConfig, TrialConfig};
use keytrial::platform;
use keytrial::runner::{TrialOutcome, TrialRunner};

/// All keys exhausted without activation (also the generic failure path).
const EXIT_EXHAUSTED: u8 = 1;
/// Host OS has no Software Licensing service.
const EXIT_UNSUPPORTED_HOST: u8 = 2;
/// Missing administrative privileges.
const EXIT_NOT_ELEVATED: u8 = 3;

/// Per-key progress belongs on stdout; `RUST_LOG` still wins over the
/// configured level.
fn init_logging(config: &LoggingConfig) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.level),
    )
    .target(env_logger::Target::Stdout)
    .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match TrialConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::from(EXIT_EXHAUSTED);
        }
    };
    init_logging(&config.logging);

    if !platform::is_supported_host() {
        log::error!("this tool only works on Windows hosts");
        return ExitCode::from(EXIT_UNSUPPORTED_HOST);
    }

    let commands = SystemRunner;
    if !platform::is_elevated(&commands, config.timeouts.status()).await {
        log::error!("administrative privileges are required; re-run from an elevated shell");
        return ExitCode::from(EXIT_NOT_ELEVATED);
    }

    let runner = TrialRunner::new(config, commands);

    // Report the current activation state before touching anything.
    log::info!("checking current activation status...");
    let (already_activated, report) = runner.check_activation_primary().await;
    log::info!("  /xpr check: {already_activated}");
    if !report.is_empty() {
        log::info!("  {report}");
    }
    log::info!("starting key trials...");

    match runner.run_from_file().await {
        Ok(TrialOutcome::Activated { line, key }) => {
            log::info!("activation successful (key on line {line}: {key})");
            ExitCode::SUCCESS
        }
        Ok(TrialOutcome::Exhausted) => {
            log::info!("activation not successful");
            ExitCode::from(EXIT_EXHAUSTED)
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::from(EXIT_EXHAUSTED)
        }
    }
}
