use buildbeacon::cli::{Cli, Commands};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    temp_env::with_var_unset("BUILDBEACON_CONFIG", || Cli::try_parse_from(args).unwrap())
}

#[test]
fn test_parse_run_defaults() {
    let cli = parse(&["buildbeacon", "run"]);

    assert_eq!(cli.config, PathBuf::from("buildbeacon.yaml"));
    assert!(!cli.json);
    match cli.command {
        Commands::Run(args) => assert!(!args.create_missing_lights),
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_global_flags_after_subcommand() {
    let cli = parse(&[
        "buildbeacon",
        "tick",
        "--create-missing-lights",
        "--json",
        "--config",
        "/etc/beacon.yaml",
    ]);

    assert!(cli.json);
    assert_eq!(cli.config, PathBuf::from("/etc/beacon.yaml"));
    match cli.command {
        Commands::Tick(args) => {
            assert!(args.create_missing_lights);
            assert!(!args.verbose);
        }
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_parse_jobs_patterns() {
    let cli = parse(&["buildbeacon", "jobs", "build-.*", "nightly"]);

    match cli.command {
        Commands::Jobs(args) => assert_eq!(args.patterns, vec!["build-.*", "nightly"]),
        other => panic!("Wrong command: {other:?}"),
    }
}

#[test]
fn test_config_from_environment() {
    let cli = temp_env::with_var("BUILDBEACON_CONFIG", Some("/srv/beacon.yaml"), || {
        Cli::try_parse_from(["buildbeacon", "validate"]).unwrap()
    });

    assert_eq!(cli.config, PathBuf::from("/srv/beacon.yaml"));
    assert!(matches!(cli.command, Commands::Validate));
}

#[test]
fn test_unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["buildbeacon", "deploy"]).is_err());
}
