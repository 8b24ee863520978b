//! The model represents the static input data provided by the user.
use crate::region::{
    RegionID, RegionMap, RegionalShares, check_shares_sum_to_one, default_regions,
    default_solar_shares,
};
use crate::technology::{
    Technology, TechnologyMap, check_technology_spec, default_initial_capacity,
    default_technologies,
};
use crate::units::Capacity;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::*;

/// Installed capacity for a technology at the start of the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct InitialCapacity {
    /// National capacity
    pub total: Capacity,
    /// How the capacity is split between regions
    pub shares: RegionalShares,
}

/// A map of [`InitialCapacity`], keyed by technology
pub type InitialCapacityMap = IndexMap<Technology, InitialCapacity>;

/// A planned capacity addition, applied when the energy system is initialised
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityAddition {
    /// The technology being built
    pub technology: Technology,
    /// Where it is built
    pub region_id: RegionID,
    /// The first year in which the capacity is available
    pub year: u32,
    /// The capacity added (MW)
    pub capacity: Capacity,
}

/// Model definition.
///
/// A model is never changed once loaded. Scenario and sensitivity variants are new values derived
/// from it.
#[derive(Debug, Clone)]
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Techno-economic parameters for each technology
    pub technologies: TechnologyMap,
    /// Regions for the model
    pub regions: RegionMap,
    /// Installed capacity at the start of the simulation
    pub initial_capacity: InitialCapacityMap,
    /// Planned capacity additions
    pub capacity_additions: Vec<CapacityAddition>,
}

impl Default for Model {
    /// The built-in model of the Bangladesh power sector
    fn default() -> Self {
        let initial_capacity = default_initial_capacity()
            .into_iter()
            .map(|(technology, total)| {
                let initial = InitialCapacity {
                    total,
                    shares: default_solar_shares(),
                };
                (technology, initial)
            })
            .collect();

        Self {
            model_path: PathBuf::new(),
            parameters: ModelParameters::default(),
            technologies: default_technologies(),
            regions: default_regions(),
            initial_capacity,
            capacity_additions: Vec::new(),
        }
    }
}

impl Model {
    /// Iterate over the model's simulated years
    pub fn iter_years(&self) -> impl Iterator<Item = u32> {
        self.parameters.years()
    }

    /// Check that all of the model's tables are consistent with one another
    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;

        ensure!(!self.regions.is_empty(), "Model has no regions");
        check_shares_sum_to_one(
            self.regions.values().map(|region| &region.demand_share),
            "demand",
        )?;

        for (technology, spec) in &self.technologies {
            check_technology_spec(*technology, spec)?;
        }

        for (technology, initial) in &self.initial_capacity {
            check_initial_capacity(*technology, initial, &self.technologies, &self.regions)?;
        }

        for addition in &self.capacity_additions {
            check_capacity_addition(addition, &self.technologies, &self.regions)?;
        }

        Ok(())
    }
}

/// Check that the initial capacity for a technology is valid
pub fn check_initial_capacity(
    technology: Technology,
    initial: &InitialCapacity,
    technologies: &TechnologyMap,
    regions: &RegionMap,
) -> Result<()> {
    ensure!(
        technologies.contains_key(&technology),
        "Initial capacity given for {technology}, which is not in the technology table"
    );
    ensure!(
        initial.total.is_finite() && initial.total >= Capacity(0.0),
        "Initial capacity for {technology} must be a finite, non-negative number"
    );
    check_capacity_shares(technology, &initial.shares, regions)
}

/// Check that the regional split of a technology's capacity is valid
pub fn check_capacity_shares(
    technology: Technology,
    shares: &RegionalShares,
    regions: &RegionMap,
) -> Result<()> {
    for region_id in shares.keys() {
        ensure!(
            regions.contains_key(region_id),
            "Unknown region {region_id} in capacity shares for {technology}"
        );
    }
    check_shares_sum_to_one(shares.values(), &technology.to_string())
        .with_context(|| format!("Invalid initial capacity for {technology}"))?;

    Ok(())
}

/// Check that a planned capacity addition refers to known entities
pub fn check_capacity_addition(
    addition: &CapacityAddition,
    technologies: &TechnologyMap,
    regions: &RegionMap,
) -> Result<()> {
    ensure!(
        technologies.contains_key(&addition.technology),
        "Capacity addition for {}, which is not in the technology table",
        addition.technology
    );
    ensure!(
        regions.contains_key(&addition.region_id),
        "Capacity addition for unknown region {}",
        addition.region_id
    );
    ensure!(
        addition.capacity.is_finite() && addition.capacity >= Capacity(0.0),
        "Capacity additions must be finite, non-negative numbers"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use crate::units::Dimensionless;
    use rstest::rstest;

    #[rstest]
    fn test_default_model_valid(model: Model) {
        model.validate().unwrap();
        assert_eq!(model.iter_years().count(), 27);
    }

    #[rstest]
    fn test_initial_capacity_bad_shares(mut model: Model) {
        let initial = model
            .initial_capacity
            .get_mut(&Technology::SolarPv)
            .unwrap();
        initial.shares[0] = Dimensionless(0.5);
        assert_error!(model.validate(), "Invalid initial capacity for solar_pv");
    }

    #[rstest]
    fn test_initial_capacity_unknown_technology(mut model: Model) {
        model.technologies.shift_remove(&Technology::SolarPv);
        assert_error!(
            model.validate(),
            "Initial capacity given for solar_pv, which is not in the technology table"
        );
    }

    #[rstest]
    fn test_capacity_addition_unknown_region(mut model: Model) {
        model.capacity_additions.push(CapacityAddition {
            technology: Technology::Wind,
            region_id: "Atlantis".into(),
            year: 2030,
            capacity: Capacity(10.0),
        });
        assert_error!(
            model.validate(),
            "Capacity addition for unknown region Atlantis"
        );
    }
}
