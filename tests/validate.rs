//! Integration tests for the `validate` command.
use bdenergy::cli::handle_validate_command;
use bdenergy::log::is_logger_initialised;
use bdenergy::settings::Settings;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get the path to the example model.
fn get_model_dir() -> PathBuf {
    PathBuf::from("demos/bangladesh")
}

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("BDENERGY_LOG_LEVEL", "off") };

    handle_validate_command(&get_model_dir(), Some(Settings::default())).unwrap();
    assert!(is_logger_initialised());

    // A scenario which changes a technology the model doesn't have
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("model.toml"), "").unwrap();
    fs::write(
        dir.path().join("technologies.csv"),
        "id,capacity_factor,capex,opex,lifetime,land_use_factor,water_use_factor,emission_factor,\
employment_factor,initial_capacity
solar_pv,0.18,800,15,25,2.5,0.0,0.0,0.5,946
natural_gas,0.85,1000,50,25,0.05,1.0,0.4,0.2,0
",
    )
    .unwrap();
    fs::write(
        dir.path().join("scenarios.toml"),
        "[[scenario]]\nid = \"cheap_wind\"\ncapex_multipliers = { wind = 0.5 }\n",
    )
    .unwrap();
    assert_eq!(
        handle_validate_command(dir.path(), Some(Settings::default()))
            .unwrap_err()
            .to_string(),
        "Failed to validate model."
    );
}
