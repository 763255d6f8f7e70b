//! Tests for command dispatch through the parsed command line

use std::sync::Once;

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use nodetree::cli::{execute_command, Cli, CliError};
use nodetree::exitcode;

const SAMPLE: &str = "tests/resources/structures/sample.toml";

static ISOLATE: Once = Once::new();

/// Point the global config at an empty directory and drop env overrides,
/// so a developer's own nodetree settings cannot change the outcome.
fn isolate_settings() {
    ISOLATE.call_once(|| {
        let empty = std::env::temp_dir().join(format!("nodetree-cli-test-{}", std::process::id()));
        std::fs::create_dir_all(&empty).unwrap();
        std::env::set_var("XDG_CONFIG_HOME", &empty);
        std::env::remove_var("NODETREE_STRUCTURE_FILE");
        std::env::remove_var("NODETREE_COLOR");
        std::env::remove_var("NODETREE_TREE_TITLE");
    });
}

fn run(args: &[&str]) -> Result<i32, CliError> {
    isolate_settings();
    // isolate from any .nodetree.toml in the working directory
    let config_dir = TempDir::new().unwrap();
    let config_dir = config_dir.path().to_string_lossy().to_string();
    let mut argv = vec!["nodetree", "-C", config_dir.as_str()];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    execute_command(&cli)
}

#[rstest]
#[case(&["-f", SAMPLE, "count"])]
#[case(&["-f", SAMPLE, "tree"])]
#[case(&["-f", SAMPLE, "list"])]
#[case(&["-f", SAMPLE, "find", "--code", "compositeNodeCode2"])]
#[case(&["-f", SAMPLE, "find", "--renderer", "renderer3"])]
#[case(&["config"])]
fn given_valid_command_when_executing_then_succeeds(#[case] args: &[&str]) {
    assert_eq!(run(args).unwrap(), exitcode::OK);
}

#[test]
fn given_unmatched_code_when_finding_then_returns_not_found() {
    assert_eq!(
        run(&["-f", SAMPLE, "find", "--code", ""]).unwrap(),
        exitcode::NOT_FOUND
    );
}

#[test]
fn given_no_lookup_key_when_finding_then_fails_with_usage() {
    let err = run(&["-f", SAMPLE, "find"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
    assert!(err.to_string().contains("invalid argument"));
}

#[test]
fn given_no_structure_file_when_counting_then_fails_with_usage() {
    let err = run(&["count"]).unwrap_err();
    assert!(matches!(err, CliError::Usage(_)));
}

#[test]
fn given_both_keys_when_parsing_then_rejects_arguments() {
    let result = Cli::try_parse_from(["nodetree", "find", "--code", "a", "--renderer", "b"]);
    assert!(result.is_err());
}

#[test]
fn given_cyclic_definition_when_counting_then_fails_with_dataerr() {
    let err = run(&["-f", "tests/resources/structures/cycle.toml", "count"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}
