//! Integration tests for CLI argument handling
//!
//! Runs the built binary with arguments that fail or succeed before any
//! network access happens.

use std::process::Command;

/// Helper to run the CLI with given args and a scrubbed environment
fn run_cli(args: &[&str]) -> std::process::Output {
    run_cli_with_log(args, "off")
}

/// Same as `run_cli`, with `RUST_LOG` set to `filter`
fn run_cli_with_log(args: &[&str], filter: &str) -> std::process::Output {
    let scratch = tempfile::TempDir::new().expect("Failed to create temp directory");
    Command::new(env!("CARGO_BIN_EXE_valocache"))
        .args(args)
        .current_dir(scratch.path())
        .env_remove("HENRIK_API_KEY")
        .env_remove("VALOCACHE_DATA_DIR")
        .env("RUST_LOG", filter)
        .output()
        .expect("Failed to execute valocache")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("valocache"), "Help should mention valocache");
    assert!(stdout.contains("max-age-hours"), "Help should mention --max-age-hours");
    assert!(stdout.contains("max-matches"), "Help should mention --max-matches");
}

#[test]
fn test_missing_player_fails() {
    let output = run_cli(&[]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_player_key_prints_error_and_exits() {
    let output = run_cli(&["NoSeparator"]);
    assert!(
        !output.status.success(),
        "Expected invalid player key to fail"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Name#Tag"),
        "Should explain the expected key format: {}",
        stderr
    );
}

#[test]
fn test_error_is_reported_once_with_logging_enabled() {
    let output = run_cli_with_log(&["NoSeparator"], "info");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(
        stderr.matches("got: 'NoSeparator'").count(),
        1,
        "Error should appear exactly once: {}",
        stderr
    );
}

#[test]
fn test_missing_api_key_prints_error_and_exits() {
    let output = run_cli(&["Henrik3#EUW3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("HENRIK_API_KEY"),
        "Should name the missing variable: {}",
        stderr
    );
}

#[test]
fn test_non_numeric_max_matches_is_rejected() {
    let output = run_cli(&["Henrik3#EUW3", "--max-matches", "lots"]);
    assert!(!output.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use valocache::cache::RefreshOptions;
    use valocache::cli::Cli;

    #[test]
    fn test_cli_defaults_match_refresh_defaults() {
        let cli = Cli::parse_from(["valocache", "Name#Tag"]);
        assert_eq!(cli.refresh_options(), RefreshOptions::default());
    }

    #[test]
    fn test_cli_player_key_is_trimmed() {
        let cli = Cli::parse_from(["valocache", "  Name#Tag "]);
        let key = cli.player_key().unwrap();
        assert_eq!(key.to_string(), "Name#Tag");
    }
}
