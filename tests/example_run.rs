//! Integration tests for the `example run` command.
use bdenergy::cli::OutputOpts;
use bdenergy::cli::example::handle_example_run_command;
use bdenergy::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("BDENERGY_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let output = OutputOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
    };
    handle_example_run_command("minimal", output, Some(Settings::default())).unwrap();

    let mut reader = csv::Reader::from_path(tempdir.path().join("annual_results.csv")).unwrap();
    assert_eq!(reader.records().count(), 3 * 7);
}
