//! Common routines for handling input data.
use crate::model::{Model, ModelParameters};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{info, warn};
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use std::fmt::Display;
use std::fs;
use std::hash::Hash;
use std::path::Path;
use std::str::FromStr;

mod capacity;
use capacity::{read_capacity_additions, read_initial_capacity};
mod region;
use region::read_regions;
pub mod scenario;
mod technology;
use technology::read_technologies;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_internal(file_path)?;
    ensure!(
        !vec.is_empty(),
        "{}: CSV file cannot be empty",
        input_err_msg(file_path)
    );

    Ok(vec)
}

/// Read a CSV file if it exists, returning `None` if it does not.
///
/// A warning is logged naming the built-in data used in its place.
pub fn read_csv_optional<T: DeserializeOwned>(
    file_path: &Path,
    fallback: &str,
) -> Result<Option<Vec<T>>> {
    if !file_path.is_file() {
        warn!(
            "No {} file provided; using {fallback}",
            file_path
                .file_name()
                .map(|name| name.to_string_lossy())
                .unwrap_or_default()
        );
        return Ok(None);
    }

    read_csv(file_path).map(Some)
}

fn read_csv_internal<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        let record: T = result.with_context(|| input_err_msg(file_path))?;
        vec.push(record);
    }

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Whether the values of a slice are strictly increasing
pub fn is_sorted_and_unique<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

/// Read a map whose keys are strings in the file but some other parseable type in memory.
///
/// TOML table keys are always strings, so this is needed for maps keyed by year or technology.
pub fn deserialise_parsed_keys<'de, D, K, V>(deserialiser: D) -> Result<IndexMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Hash + Eq,
    K::Err: Display,
    V: Deserialize<'de>,
{
    let raw: IndexMap<String, V> = IndexMap::deserialize(deserialiser)?;
    raw.into_iter()
        .map(|(key, value)| {
            let parsed = key.parse().map_err(|err| {
                <D::Error as serde::de::Error>::custom(format!("Invalid key '{key}': {err}"))
            })?;
            Ok((parsed, value))
        })
        .collect()
}

/// Read a model from the specified directory.
///
/// Only `model.toml` is required. Any of the CSV files which are missing are replaced by the
/// built-in data for Bangladesh.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let (technologies, initial_totals) = read_technologies(model_dir)?;
    let regions = read_regions(model_dir)?;
    let initial_capacity = read_initial_capacity(model_dir, &initial_totals, &regions)?;
    let capacity_additions = read_capacity_additions(model_dir, &technologies, &regions)?;

    let model = Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        technologies,
        regions,
        initial_capacity,
        capacity_additions,
    };
    info!(
        "Loaded model from {} ({} technologies, {} regions, {}-{})",
        model_dir.display(),
        model.technologies.len(),
        model.regions.len(),
        model.parameters.start_year,
        model.parameters.end_year
    );

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::technology::Technology;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value\nhello, 1\nworld,2").unwrap();
        }

        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            [
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // Empty file
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,value").unwrap();
        }
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_csv_optional_missing() {
        let dir = tempdir().unwrap();
        let records: Option<Vec<Record>> =
            read_csv_optional(&dir.path().join("missing.csv"), "nothing").unwrap();
        assert!(records.is_none());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Targets {
        #[serde(deserialize_with = "deserialise_parsed_keys")]
        targets: IndexMap<u32, f64>,
        #[serde(deserialize_with = "deserialise_parsed_keys")]
        prices: IndexMap<Technology, f64>,
    }

    #[test]
    fn test_deserialise_parsed_keys() {
        let parsed: Targets =
            toml::from_str("targets = { 2030 = 0.5 }\nprices = { coal = 3.0 }").unwrap();
        assert_eq!(parsed.targets, IndexMap::from([(2030, 0.5)]));
        assert_eq!(parsed.prices, IndexMap::from([(Technology::Coal, 3.0)]));

        assert!(toml::from_str::<Targets>("targets = { x = 0.5 }\nprices = {}").is_err());
    }

    #[test]
    fn test_read_toml_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("model.toml");
        let result: Result<ModelParameters> = read_toml(&file_path);
        assert_eq!(
            result.unwrap_err().to_string(),
            input_err_msg(&file_path)
        );
    }

    #[rstest]
    #[case(&[1, 2], true)]
    #[case(&[1, 1], false)]
    #[case(&[2, 1], false)]
    #[case(&[], true)]
    fn test_is_sorted_and_unique(#[case] values: &[u32], #[case] expected: bool) {
        assert_eq!(is_sorted_and_unique(values), expected);
    }

    #[test]
    fn test_load_model_defaults() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("model.toml")).unwrap();

        let model = load_model(dir.path()).unwrap();
        assert_eq!(model.technologies.len(), 6);
        assert_eq!(model.regions.len(), 8);
        assert_eq!(model.initial_capacity.len(), 1);
        assert!(model.capacity_additions.is_empty());
    }
}
