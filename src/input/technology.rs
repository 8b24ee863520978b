//! Code for reading the technology table from a CSV file.
use super::*;
use crate::technology::{
    Technology, TechnologyMap, TechnologySpec, check_technology_spec, default_initial_capacity,
    default_technologies,
};
use crate::units::{Capacity, Dimensionless};

const TECHNOLOGIES_FILE_NAME: &str = "technologies.csv";

/// A row of the technologies CSV file
#[derive(Debug, Deserialize, PartialEq)]
struct TechnologyRaw {
    id: Technology,
    capacity_factor: Dimensionless,
    capex: f64,
    opex: f64,
    lifetime: u32,
    land_use_factor: f64,
    water_use_factor: f64,
    emission_factor: f64,
    employment_factor: f64,
    #[serde(default)]
    initial_capacity: Capacity,
}

/// Read the technology table and national initial capacities from the model folder.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The technology table, plus the initial capacity of each technology with some installed
pub fn read_technologies(
    model_dir: &Path,
) -> Result<(TechnologyMap, IndexMap<Technology, Capacity>)> {
    let file_path = model_dir.join(TECHNOLOGIES_FILE_NAME);
    let Some(raw) = read_csv_optional(&file_path, "built-in technology data")? else {
        return Ok((default_technologies(), default_initial_capacity()));
    };

    read_technologies_from_iter(raw.into_iter()).with_context(|| input_err_msg(&file_path))
}

fn read_technologies_from_iter<I>(iter: I) -> Result<(TechnologyMap, IndexMap<Technology, Capacity>)>
where
    I: Iterator<Item = TechnologyRaw>,
{
    let mut technologies = TechnologyMap::new();
    let mut initial_capacity = IndexMap::new();
    for raw in iter {
        let spec = TechnologySpec {
            capacity_factor: raw.capacity_factor,
            capex: raw.capex,
            opex: raw.opex,
            lifetime: raw.lifetime,
            land_use_factor: raw.land_use_factor,
            water_use_factor: raw.water_use_factor,
            emission_factor: raw.emission_factor,
            employment_factor: raw.employment_factor,
        };
        check_technology_spec(raw.id, &spec)?;
        ensure!(
            technologies.insert(raw.id, spec).is_none(),
            "Duplicate technology {}",
            raw.id
        );

        ensure!(
            raw.initial_capacity.is_finite() && raw.initial_capacity >= Capacity(0.0),
            "Initial capacity for {} must be a finite, non-negative number",
            raw.id
        );
        if raw.initial_capacity > Capacity(0.0) {
            initial_capacity.insert(raw.id, raw.initial_capacity);
        }
    }

    Ok((technologies, initial_capacity))
}
