//! Tests for command-line argument parsing
//!
//! Note: These tests verify the argument parser configuration by creating
//! a test parser with the same structure as the main application.

use clap::{Arg, ArgAction, Command as ClapCommand};

/// Create a command with the same argument structure as the main binary
fn create_test_command() -> ClapCommand {
    ClapCommand::new("face-overlay")
        .version("0.1.0")
        .about("Landmark-anchored image overlays for webcam video")
        .arg(Arg::new("config").short('C').long("config").value_name("PATH"))
        .arg(Arg::new("frames").short('i').long("frames").value_name("PATH"))
        .arg(Arg::new("landmarks").short('l').long("landmarks").value_name("PATH"))
        .arg(Arg::new("filter").short('f').long("filter").value_name("NAME"))
        .arg(Arg::new("assets").short('a').long("assets").value_name("DIR"))
        .arg(Arg::new("timeout-ms").long("timeout-ms").value_name("MS").value_parser(clap::value_parser!(u64)))
        .arg(Arg::new("max-frames").long("max-frames").value_name("N").value_parser(clap::value_parser!(u64)))
        .arg(
            Arg::new("fps")
                .long("fps")
                .value_name("FPS")
                .default_value("0")
                .value_parser(clap::value_parser!(f64)),
        )
        .arg(Arg::new("photo").short('p').long("photo").action(ArgAction::SetTrue))
        .arg(Arg::new("output-dir").short('o').long("output-dir").value_name("DIR"))
        .arg(Arg::new("print-config").long("print-config").action(ArgAction::SetTrue))
        .arg(Arg::new("debug").short('d').long("debug").action(ArgAction::SetTrue))
}

#[test]
fn test_help_argument() {
    let result = create_test_command().try_get_matches_from(vec!["face-overlay", "--help"]);

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn test_no_arguments() {
    let matches = create_test_command().try_get_matches_from(vec!["face-overlay"]).unwrap();

    assert_eq!(matches.get_one::<f64>("fps"), Some(&0.0));
    assert!(!matches.get_flag("photo"));
    assert!(matches.get_one::<String>("filter").is_none());
}

#[test]
fn test_replay_arguments() {
    let matches = create_test_command()
        .try_get_matches_from(vec![
            "face-overlay",
            "-i",
            "frames/",
            "-l",
            "landmarks.json",
            "--filter",
            "glasses",
            "--photo",
            "-o",
            "out",
        ])
        .unwrap();

    assert_eq!(matches.get_one::<String>("frames").map(String::as_str), Some("frames/"));
    assert_eq!(
        matches.get_one::<String>("landmarks").map(String::as_str),
        Some("landmarks.json")
    );
    assert_eq!(matches.get_one::<String>("filter").map(String::as_str), Some("glasses"));
    assert!(matches.get_flag("photo"));
    assert_eq!(matches.get_one::<String>("output-dir").map(String::as_str), Some("out"));
}

#[test]
fn test_filter_names() {
    for filter in ["none", "glasses", "ears", "mask", "whiskers"] {
        let result = create_test_command().try_get_matches_from(vec!["face-overlay", "--filter", filter]);

        assert!(result.is_ok(), "Should accept filter: {filter}");
        assert_eq!(
            result.unwrap().get_one::<String>("filter").map(String::as_str),
            Some(filter)
        );
    }
}

#[test]
fn test_numeric_arguments() {
    let matches = create_test_command()
        .try_get_matches_from(vec!["face-overlay", "--timeout-ms", "250", "--max-frames", "10", "--fps", "30"])
        .unwrap();
    assert_eq!(matches.get_one::<u64>("timeout-ms"), Some(&250));
    assert_eq!(matches.get_one::<u64>("max-frames"), Some(&10));
    assert_eq!(matches.get_one::<f64>("fps"), Some(&30.0));
}

#[test]
fn test_invalid_numeric_arguments() {
    for args in [
        vec!["face-overlay", "--timeout-ms", "soon"],
        vec!["face-overlay", "--max-frames", "-1"],
        vec!["face-overlay", "--fps", "fast"],
    ] {
        assert!(create_test_command().try_get_matches_from(args.clone()).is_err(), "{args:?}");
    }
}

#[test]
fn test_boolean_flags() {
    for flag in ["--photo", "--print-config", "--debug"] {
        let matches = create_test_command()
            .try_get_matches_from(vec!["face-overlay", flag])
            .unwrap();
        assert!(matches.get_flag(flag.trim_start_matches("--")), "Flag {flag} should be set");
    }
}
