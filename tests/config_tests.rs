//! Configuration loading tests.
//!
//! These mutate process environment variables, so they are serialized.

use std::env;

use serial_test::serial;

use keytrial::config::TrialConfig;

const ENV_VARS: &[&str] = &[
    "KEYTRIAL_KEY_FILE",
    "KEYTRIAL_POST_ACTION_DELAY_SECS",
    "KEYTRIAL_INSTALL_TIMEOUT_SECS",
    "KEYTRIAL_ACTIVATE_TIMEOUT_SECS",
    "KEYTRIAL_STATUS_TIMEOUT_SECS",
    "KEYTRIAL_LOG_LEVEL",
];

fn clear_env() {
    for var in ENV_VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn load_uses_defaults_without_overrides() {
    clear_env();

    let config = TrialConfig::load().expect("load failed");
    assert_eq!(config.trial.key_file, "keys.txt");
    assert_eq!(config.trial.post_action_delay_secs, 3);
    assert_eq!(config.timeouts.install_secs, 60);
    assert_eq!(config.timeouts.activate_secs, 120);
    assert_eq!(config.timeouts.status_secs, 60);
    assert_eq!(config.logging.level, "info");
}

#[test]
#[serial]
fn env_overrides_take_precedence() {
    clear_env();
    env::set_var("KEYTRIAL_KEY_FILE", "alt-keys.txt");
    env::set_var("KEYTRIAL_ACTIVATE_TIMEOUT_SECS", "30");
    env::set_var("KEYTRIAL_POST_ACTION_DELAY_SECS", "0");

    let config = TrialConfig::load().expect("load failed");
    assert_eq!(config.trial.key_file, "alt-keys.txt");
    assert_eq!(config.timeouts.activate_secs, 30);
    assert_eq!(config.trial.post_action_delay_secs, 0);
    // Untouched options keep their defaults.
    assert_eq!(config.timeouts.install_secs, 60);

    clear_env();
}

#[test]
#[serial]
fn unparseable_numeric_env_falls_back_to_default() {
    clear_env();
    env::set_var("KEYTRIAL_INSTALL_TIMEOUT_SECS", "soon");

    let config = TrialConfig::load().expect("load failed");
    assert_eq!(config.timeouts.install_secs, 60);

    clear_env();
}

#[test]
#[serial]
fn invalid_log_level_fails_validation() {
    clear_env();
    env::set_var("KEYTRIAL_LOG_LEVEL", "noisy");

    assert!(TrialConfig::load().is_err());

    clear_env();
}
