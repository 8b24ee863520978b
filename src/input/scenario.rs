//! Code for reading scenario definitions from a TOML file.
use super::*;
use crate::model::check_renewable_targets;
use crate::scenario::{ScenarioDefinition, ScenarioID};
use crate::technology::Technology;
use crate::units::Dimensionless;
use std::collections::HashSet;

const SCENARIOS_FILE_NAME: &str = "scenarios.toml";

/// A table keyed by technology name
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
struct TechnologyMultipliers(
    #[serde(deserialize_with = "deserialise_parsed_keys")] IndexMap<Technology, Dimensionless>,
);

/// A table keyed by year
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RenewableTargets(
    #[serde(deserialize_with = "deserialise_parsed_keys")] IndexMap<u32, Dimensionless>,
);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioRaw {
    id: ScenarioID,
    #[serde(default)]
    description: String,
    renewable_targets: Option<RenewableTargets>,
    #[serde(default)]
    capex_multipliers: TechnologyMultipliers,
    #[serde(default)]
    opex_multipliers: TechnologyMultipliers,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenariosFile {
    #[serde(default)]
    scenario: Vec<ScenarioRaw>,
}

/// Read the scenarios for a model, falling back on the built-in scenarios.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The scenario definitions, in the order they appear in the file
pub fn read_scenarios(model_dir: &Path) -> Result<Vec<ScenarioDefinition>> {
    let file_path = model_dir.join(SCENARIOS_FILE_NAME);
    if !file_path.is_file() {
        warn!(
            "No {} file provided; using the built-in scenarios",
            SCENARIOS_FILE_NAME
        );
        return Ok(ScenarioDefinition::builtin());
    }

    let file: ScenariosFile = read_toml(&file_path)?;
    read_scenarios_from_iter(file.scenario.into_iter()).with_context(|| input_err_msg(&file_path))
}

fn read_scenarios_from_iter<I>(iter: I) -> Result<Vec<ScenarioDefinition>>
where
    I: Iterator<Item = ScenarioRaw>,
{
    let mut ids = HashSet::new();
    let mut scenarios = Vec::new();
    for raw in iter {
        ensure!(
            ids.insert(raw.id.clone()),
            "Duplicate scenario ID {}",
            raw.id
        );

        let renewable_targets = raw.renewable_targets.map(|targets| targets.0);
        if let Some(targets) = &renewable_targets {
            check_renewable_targets(targets)
                .with_context(|| format!("Invalid targets for scenario {}", raw.id))?;
        }

        let scenario = ScenarioDefinition {
            id: raw.id,
            description: raw.description,
            renewable_targets,
            capex_multipliers: raw.capex_multipliers.0,
            opex_multipliers: raw.opex_multipliers.0,
            seed: raw.seed,
        };
        scenario.validate()?;
        scenarios.push(scenario);
    }

    ensure!(!scenarios.is_empty(), "No scenarios defined");

    Ok(scenarios)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use std::fs;
    use tempfile::tempdir;

    fn parse(contents: &str) -> Result<Vec<ScenarioDefinition>> {
        let file: ScenariosFile = toml::from_str(contents)?;
        read_scenarios_from_iter(file.scenario.into_iter())
    }

    #[test]
    fn test_read_scenarios_missing_file() {
        let dir = tempdir().unwrap();
        assert_eq!(
            read_scenarios(dir.path()).unwrap(),
            ScenarioDefinition::builtin()
        );
    }

    #[test]
    fn test_read_scenarios() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(SCENARIOS_FILE_NAME),
            r#"
[[scenario]]
id = "baseline"

[[scenario]]
id = "cheap_wind"
description = "Wind halves in price"
renewable_targets = { 2030 = 0.3, 2050 = 0.9 }
capex_multipliers = { wind = 0.5 }
seed = 7
"#,
        )
        .unwrap();

        let scenarios = read_scenarios(dir.path()).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(scenarios[0].id, ScenarioID::from("baseline"));
        assert!(scenarios[0].renewable_targets.is_none());
        assert!(scenarios[0].capex_multipliers.is_empty());

        let cheap_wind = &scenarios[1];
        assert_eq!(cheap_wind.description, "Wind halves in price");
        assert_eq!(
            cheap_wind.renewable_targets,
            Some(IndexMap::from([
                (2030, Dimensionless(0.3)),
                (2050, Dimensionless(0.9))
            ]))
        );
        assert_eq!(
            cheap_wind.capex_multipliers,
            IndexMap::from([(Technology::Wind, Dimensionless(0.5))])
        );
        assert!(cheap_wind.opex_multipliers.is_empty());
        assert_eq!(cheap_wind.seed, Some(7));
    }

    #[test]
    fn test_read_scenarios_unknown_technology() {
        assert!(parse("[[scenario]]\nid = \"a\"\ncapex_multipliers = { fusion = 0.5 }").is_err());
    }

    #[test]
    fn test_read_scenarios_duplicate_id() {
        assert_error!(
            parse("[[scenario]]\nid = \"a\"\n[[scenario]]\nid = \"a\""),
            "Duplicate scenario ID a"
        );
    }

    #[test]
    fn test_read_scenarios_bad_multiplier() {
        assert_error!(
            parse("[[scenario]]\nid = \"a\"\nopex_multipliers = { coal = -1.0 }"),
            "Scenario a: opex multiplier for coal must be greater than zero"
        );
    }

    #[test]
    fn test_read_scenarios_bad_targets() {
        assert!(parse("[[scenario]]\nid = \"a\"\nrenewable_targets = { 2030 = 1.5 }").is_err());
    }

    #[test]
    fn test_read_scenarios_empty() {
        assert_error!(parse(""), "No scenarios defined");
    }
}
