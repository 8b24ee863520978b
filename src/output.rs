//! The module responsible for writing output data to disk.
use crate::scenario::{AnnualResult, ScenarioID, ScenarioResult, TargetAssessment, TechnologyResult};
use crate::sensitivity::{SensitivityParameter, SensitivityRow, SensitivityStatistics};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "bdenergy_results";

/// The output file name for national results by year
const ANNUAL_RESULTS_FILE_NAME: &str = "annual_results.csv";

/// The output file name for results by year and technology
const TECHNOLOGY_RESULTS_FILE_NAME: &str = "technology_results.csv";

/// The output file name for progress towards renewable targets
const TARGET_ASSESSMENT_FILE_NAME: &str = "target_assessment.csv";

/// The output file name for sensitivity runs
const SENSITIVITY_RESULTS_FILE_NAME: &str = "sensitivity_results.csv";

/// The output file name for summary statistics of sensitivity runs
const SENSITIVITY_STATISTICS_FILE_NAME: &str = "sensitivity_statistics.csv";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory.
///
/// A folder which already has files in it is only reused if `allow_overwrite` is set, in which
/// case its contents are deleted first.
///
/// # Returns
///
/// Whether an existing folder was overwritten
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace its contents."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Identifies the scenario a row of output belongs to.
///
/// This is written along with the row itself.
#[derive(Serialize, Debug, PartialEq)]
struct ScenarioRow<'a> {
    scenario_id: &'a ScenarioID,
}

/// Identifies the sensitivity run a row of output belongs to.
///
/// This is written along with an [`AnnualResult`] for the target year.
#[derive(Serialize, Debug, PartialEq)]
struct SensitivityKeyRow {
    parameter: SensitivityParameter,
    value: f64,
}

/// An object for writing scenario results to CSV files
pub struct DataWriter {
    annual_writer: csv::Writer<File>,
    technologies_writer: csv::Writer<File>,
    targets_writer: csv::Writer<File>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    pub fn create(output_path: &Path) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            annual_writer: new_writer(ANNUAL_RESULTS_FILE_NAME)?,
            technologies_writer: new_writer(TECHNOLOGY_RESULTS_FILE_NAME)?,
            targets_writer: new_writer(TARGET_ASSESSMENT_FILE_NAME)?,
        })
    }

    /// Write all of a scenario's results
    pub fn write_scenario(&mut self, result: &ScenarioResult) -> Result<()> {
        let key = ScenarioRow {
            scenario_id: &result.scenario_id,
        };
        self.write_annual(&key, &result.annual)?;
        self.write_technologies(&key, &result.technologies)?;
        self.write_targets(&key, &result.targets)?;

        Ok(())
    }

    fn write_annual(&mut self, key: &ScenarioRow, rows: &[AnnualResult]) -> Result<()> {
        for row in rows {
            self.annual_writer.serialize((key, row))?;
        }

        Ok(())
    }

    fn write_technologies(&mut self, key: &ScenarioRow, rows: &[TechnologyResult]) -> Result<()> {
        for row in rows {
            self.technologies_writer.serialize((key, row))?;
        }

        Ok(())
    }

    fn write_targets(&mut self, key: &ScenarioRow, rows: &[TargetAssessment]) -> Result<()> {
        for row in rows {
            self.targets_writer.serialize((key, row))?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.annual_writer.flush()?;
        self.technologies_writer.flush()?;
        self.targets_writer.flush()?;

        Ok(())
    }
}

/// Write the results of a sensitivity analysis to CSV files
///
/// # Arguments
///
/// * `output_path` - Folder where files will be saved
/// * `rows` - The target-year results of each run
/// * `statistics` - Summary statistics for each parameter and metric
pub fn write_sensitivity(
    output_path: &Path,
    rows: &[SensitivityRow],
    statistics: &[SensitivityStatistics],
) -> Result<()> {
    let mut results_writer =
        csv::Writer::from_path(output_path.join(SENSITIVITY_RESULTS_FILE_NAME))?;
    for row in rows {
        let key = SensitivityKeyRow {
            parameter: row.parameter,
            value: row.value,
        };
        results_writer.serialize((key, &row.result))?;
    }
    results_writer.flush()?;

    let mut statistics_writer =
        csv::Writer::from_path(output_path.join(SENSITIVITY_STATISTICS_FILE_NAME))?;
    for statistic in statistics {
        statistics_writer.serialize(statistic)?;
    }
    statistics_writer.flush()?;

    Ok(())
}
