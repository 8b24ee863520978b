//! Code for writing metadata to file
use crate::scenario::{ScenarioID, ScenarioResult};
use anyhow::{Result, anyhow};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get information about program version from git
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
    #[serde(rename = "scenario", skip_serializing_if = "Vec::is_empty")]
    scenarios: Vec<ScenarioMetadata<'a>>,
}

/// Information about the model run
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run
    model_path: &'a Path,
    /// The kind of run (e.g. scenarios or sensitivity)
    run_type: &'a str,
    /// The base seed for the capacity factor noise (as a string, as it may not fit in a TOML
    /// integer)
    seed: String,
    /// The date and time on which the run started
    datetime: String,
}

impl<'a> RunMetadata<'a> {
    fn new(model_path: &'a Path, run_type: &'a str, seed: u64) -> Self {
        let dt = Local::now();
        Self {
            model_path,
            run_type,
            seed: seed.to_string(),
            datetime: dt.to_rfc2822(),
        }
    }
}

/// Information about one of the scenarios which was run
#[derive(Serialize)]
struct ScenarioMetadata<'a> {
    id: &'a ScenarioID,
    description: &'a str,
    /// The changes the scenario made to the model
    modifications: &'a [String],
    /// The seed used for the scenario (as a string, as it may not fit in a TOML integer)
    seed: String,
}

impl<'a> From<&'a ScenarioResult> for ScenarioMetadata<'a> {
    fn from(result: &'a ScenarioResult) -> Self {
        Self {
            id: &result.scenario_id,
            description: &result.description,
            modifications: &result.modifications,
            seed: result.seed.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile the program
    rustc_version: &'a str,
    /// When the program was built
    build_time_utc: &'a str,
    /// The git commit hash for this version of the program (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the platform on which the program is running.
///
/// The fields correspond to different data available from the [`PlatformInfo`] struct.
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;

        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to the specified output path in TOML format
///
/// # Arguments
///
/// * `output_path` - Folder where the file will be saved
/// * `model_path` - Path to the model which was run
/// * `run_type` - The kind of run
/// * `seed` - The base seed for the capacity factor noise
/// * `scenarios` - The results of each scenario run, if any
pub fn write_metadata(
    output_path: &Path,
    model_path: &Path,
    run_type: &str,
    seed: u64,
    scenarios: &[ScenarioResult],
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata::new(model_path, run_type, seed),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
        scenarios: scenarios.iter().map(ScenarioMetadata::from).collect(),
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::short_model;
    use crate::model::Model;
    use crate::scenario::ScenarioDefinition;
    use rstest::rstest;
    use tempfile::tempdir;

    fn read_metadata(output_path: &Path) -> toml::Table {
        let contents = fs::read_to_string(output_path.join(METADATA_FILE_NAME)).unwrap();
        toml::from_str(&contents).unwrap()
    }

    #[test]
    fn test_write_metadata() {
        let dir = tempdir().unwrap();
        let model_path = Path::new("demos/bangladesh");
        write_metadata(dir.path(), model_path, "sensitivity", 42, &[]).unwrap();

        let table = read_metadata(dir.path());
        assert_eq!(table["run"]["run_type"].as_str(), Some("sensitivity"));
        assert_eq!(table["run"]["seed"].as_str(), Some("42"));
        assert_eq!(table["program"]["name"].as_str(), Some("bdenergy"));
        assert!(!table.contains_key("scenario"));
    }

    #[rstest]
    fn test_write_metadata_scenarios(short_model: Model) {
        let mut seeded = ScenarioDefinition::delayed();
        seeded.seed = Some(99);
        let results = [
            ScenarioDefinition::baseline().run(&short_model).unwrap(),
            seeded.run(&short_model).unwrap(),
        ];

        let dir = tempdir().unwrap();
        write_metadata(dir.path(), Path::new("demos/bangladesh"), "scenarios", 42, &results)
            .unwrap();

        let table = read_metadata(dir.path());
        let scenarios = table["scenario"].as_array().unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0]["id"].as_str(), Some("baseline"));
        assert_eq!(scenarios[0]["seed"].as_str(), Some("42"));
        assert_eq!(scenarios[0]["modifications"].as_array().unwrap().len(), 0);
        assert_eq!(scenarios[1]["id"].as_str(), Some("delayed"));
        assert_eq!(
            scenarios[1]["description"].as_str(),
            Some("Delayed transition with dearer renewables")
        );
        assert_eq!(scenarios[1]["seed"].as_str(), Some("99"));
        assert!(
            scenarios[1]["modifications"]
                .as_array()
                .unwrap()
                .iter()
                .any(|m| m.as_str() == Some("wind capex x1.2"))
        );
    }
}
