//! Environmental and social impacts of generation: emissions, resource use, pollution and jobs.
use crate::model::{Model, UnknownTechnologyPolicy};
use crate::technology::{Technology, TechnologyMap, TechnologySpec};
use crate::units::{Capacity, Energy};
use anyhow::{Result, bail};
use indexmap::IndexMap;
use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator};

/// The technology whose impacts are avoided by renewable generation
const DISPLACED_TECHNOLOGY: Technology = Technology::NaturalGas;

/// The number of kg in a tonne
const KG_PER_TONNE: f64 = 1000.0;

/// Local air pollutants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Pollutant {
    /// Sulphur dioxide
    #[strum(to_string = "SO2")]
    SO2,
    /// Nitrogen oxides
    #[strum(to_string = "NOx")]
    NOx,
    /// Fine particulate matter
    #[strum(to_string = "PM2.5")]
    PM25,
}

impl Pollutant {
    /// Emissions of this pollutant (kg/MWh) for a technology
    fn emission_factor(self, technology: Technology) -> f64 {
        let (so2, nox, pm25) = match technology {
            Technology::NaturalGas => (0.001, 0.5, 0.01),
            Technology::Coal => (2.0, 1.5, 0.5),
            Technology::Biomass => (0.1, 0.8, 0.2),
            _ => (0.0, 0.0, 0.0),
        };

        match self {
            Self::SO2 => so2,
            Self::NOx => nox,
            Self::PM25 => pm25,
        }
    }

    /// Health impact per tonne emitted
    fn health_factor(self) -> f64 {
        match self {
            Self::SO2 => 0.05,
            Self::NOx => 0.03,
            Self::PM25 => 0.1,
        }
    }
}

/// Kinds of solid waste
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum WasteType {
    /// Combustion ash
    Ash,
    /// Scrubber and treatment sludge
    Sludge,
    /// Hazardous waste
    Hazardous,
    /// Decommissioned panels and cells
    ElectronicWaste,
}

impl WasteType {
    /// Waste produced (tonnes/MW/year) by a technology
    fn factor(self, technology: Technology) -> f64 {
        match (technology, self) {
            (Technology::Coal, Self::Ash) => 100.0,
            (Technology::Coal, Self::Sludge) => 10.0,
            (Technology::Coal, Self::Hazardous) => 1.0,
            (Technology::Biomass, Self::Ash) => 50.0,
            (Technology::Biomass, Self::Sludge) => 5.0,
            (Technology::Biomass, Self::Hazardous) => 0.5,
            (Technology::SolarPv, Self::ElectronicWaste) => 0.1,
            (Technology::SolarPv, Self::Hazardous) => 0.01,
            (Technology::BatteryStorage, Self::ElectronicWaste) => 0.2,
            (Technology::BatteryStorage, Self::Hazardous) => 0.05,
            _ => 0.0,
        }
    }
}

/// All environmental impacts of a technology in one year
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentalRecord {
    /// CO2 emissions (tonnes)
    pub emissions: f64,
    /// Water consumption
    pub water_use: f64,
    /// Land use
    pub land_use: f64,
    /// Air pollutant emissions (kg)
    pub air_pollutants: IndexMap<Pollutant, f64>,
    /// Health impacts by pollutant
    pub health_impacts: IndexMap<Pollutant, f64>,
    /// Solid waste (tonnes)
    pub waste: IndexMap<WasteType, f64>,
}

/// Impacts avoided by renewable generation displacing gas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvoidedImpacts {
    /// CO2 emissions avoided (tonnes)
    pub emissions: f64,
    /// Water consumption avoided
    pub water_use: f64,
}

/// Calculates environmental impacts using a model's technology table
pub struct EnvironmentalCalculator<'a> {
    technologies: &'a TechnologyMap,
    policy: UnknownTechnologyPolicy,
}

impl<'a> EnvironmentalCalculator<'a> {
    /// Create a calculator for the given model
    pub fn new(model: &'a Model) -> Self {
        Self {
            technologies: &model.technologies,
            policy: model.parameters.unknown_technology_policy,
        }
    }

    /// Apply a per-unit factor from the technology table, or the unknown technology policy
    fn scaled<F>(&self, technology: Technology, quantity: f64, factor: F) -> Result<f64>
    where
        F: Fn(&TechnologySpec) -> f64,
    {
        match self.technologies.get(&technology) {
            Some(spec) => Ok(quantity * factor(spec)),
            None => match self.policy {
                UnknownTechnologyPolicy::Zero => Ok(0.0),
                UnknownTechnologyPolicy::Error => {
                    bail!("No environmental data for technology {technology}")
                }
            },
        }
    }

    /// CO2 emissions (tonnes) from generating `generation`
    pub fn calculate_emissions(&self, technology: Technology, generation: Energy) -> Result<f64> {
        self.scaled(technology, generation.value(), |spec| spec.emission_factor)
    }

    /// Water consumed by generating `generation`
    pub fn calculate_water_use(&self, technology: Technology, generation: Energy) -> Result<f64> {
        self.scaled(technology, generation.value(), |spec| spec.water_use_factor)
    }

    /// Land occupied by `capacity` of a technology
    pub fn calculate_land_use(&self, technology: Technology, capacity: Capacity) -> Result<f64> {
        self.scaled(technology, capacity.value(), |spec| spec.land_use_factor)
    }

    /// Direct jobs supported by `capacity` of a technology
    pub fn calculate_employment(&self, technology: Technology, capacity: Capacity) -> Result<f64> {
        self.scaled(technology, capacity.value(), |spec| spec.employment_factor)
    }

    /// Air pollutant emissions (kg) from generating `generation`.
    ///
    /// Technologies which burn nothing emit none.
    pub fn calculate_air_pollutants(
        &self,
        technology: Technology,
        generation: Energy,
    ) -> IndexMap<Pollutant, f64> {
        Pollutant::iter()
            .map(|pollutant| {
                let emissions = generation.value() * pollutant.emission_factor(technology);
                (pollutant, emissions)
            })
            .collect()
    }

    /// Health impacts of air pollutant emissions given in kg
    pub fn calculate_health_impacts(
        &self,
        pollutants: &IndexMap<Pollutant, f64>,
    ) -> IndexMap<Pollutant, f64> {
        pollutants
            .iter()
            .map(|(pollutant, kg)| (*pollutant, kg / KG_PER_TONNE * pollutant.health_factor()))
            .collect()
    }

    /// Solid waste (tonnes/year) produced by `capacity` of a technology.
    ///
    /// Only waste types the technology produces are included.
    pub fn calculate_waste(
        &self,
        technology: Technology,
        capacity: Capacity,
    ) -> IndexMap<WasteType, f64> {
        WasteType::iter()
            .map(|waste_type| (waste_type, waste_type.factor(technology)))
            .filter(|(_, factor)| *factor > 0.0)
            .map(|(waste_type, factor)| (waste_type, capacity.value() * factor))
            .collect()
    }

    /// CO2 and water that gas generation would have caused in place of renewable generation
    pub fn calculate_avoided_impacts(
        &self,
        renewable_generation: Energy,
    ) -> Result<AvoidedImpacts> {
        Ok(AvoidedImpacts {
            emissions: self.calculate_emissions(DISPLACED_TECHNOLOGY, renewable_generation)?,
            water_use: self.calculate_water_use(DISPLACED_TECHNOLOGY, renewable_generation)?,
        })
    }

    /// All impacts of a technology with the given generation and capacity
    pub fn assess(
        &self,
        technology: Technology,
        generation: Energy,
        capacity: Capacity,
    ) -> Result<EnvironmentalRecord> {
        let air_pollutants = self.calculate_air_pollutants(technology, generation);
        let health_impacts = self.calculate_health_impacts(&air_pollutants);

        Ok(EnvironmentalRecord {
            emissions: self.calculate_emissions(technology, generation)?,
            water_use: self.calculate_water_use(technology, generation)?,
            land_use: self.calculate_land_use(technology, capacity)?,
            air_pollutants,
            health_impacts,
            waste: self.calculate_waste(technology, capacity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_calculate_emissions(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        assert_eq!(
            calculator
                .calculate_emissions(Technology::Coal, Energy(1000.0))
                .unwrap(),
            800.0
        );
        assert_eq!(
            calculator
                .calculate_emissions(Technology::SolarPv, Energy(1000.0))
                .unwrap(),
            0.0
        );
    }

    #[rstest]
    fn test_calculate_land_use(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        assert_eq!(
            calculator
                .calculate_land_use(Technology::SolarPv, Capacity(1000.0))
                .unwrap(),
            2500.0
        );
    }

    #[rstest]
    fn test_calculate_employment(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        assert_eq!(
            calculator
                .calculate_employment(Technology::SolarPv, Capacity(100.0))
                .unwrap(),
            50.0
        );
    }

    #[rstest]
    fn test_calculate_water_use(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        assert_eq!(
            calculator
                .calculate_water_use(Technology::Biomass, Energy(10.0))
                .unwrap(),
            15.0
        );
    }

    #[rstest]
    fn test_unknown_technology(mut model: Model) {
        model.technologies.shift_remove(&Technology::Coal);
        let calculator = EnvironmentalCalculator::new(&model);
        assert_eq!(
            calculator
                .calculate_emissions(Technology::Coal, Energy(1000.0))
                .unwrap(),
            0.0
        );

        model.parameters.unknown_technology_policy = UnknownTechnologyPolicy::Error;
        let calculator = EnvironmentalCalculator::new(&model);
        assert_error!(
            calculator.calculate_emissions(Technology::Coal, Energy(1000.0)),
            "No environmental data for technology coal"
        );
    }

    #[rstest]
    fn test_air_pollutants_and_health(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        let pollutants = calculator.calculate_air_pollutants(Technology::Coal, Energy(1000.0));
        assert_eq!(pollutants[&Pollutant::SO2], 2000.0);
        assert_eq!(pollutants[&Pollutant::NOx], 1500.0);
        assert_eq!(pollutants[&Pollutant::PM25], 500.0);

        let health = calculator.calculate_health_impacts(&pollutants);
        assert_approx_eq!(f64, health[&Pollutant::SO2], 0.1, epsilon = 1e-12);
        assert_approx_eq!(f64, health[&Pollutant::NOx], 0.045, epsilon = 1e-12);
        assert_approx_eq!(f64, health[&Pollutant::PM25], 0.05, epsilon = 1e-12);

        let pollutants = calculator.calculate_air_pollutants(Technology::Wind, Energy(1000.0));
        assert!(pollutants.values().all(|kg| *kg == 0.0));
    }

    #[rstest]
    fn test_waste(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        let waste = calculator.calculate_waste(Technology::SolarPv, Capacity(10.0));
        assert_eq!(
            waste,
            IndexMap::from([(WasteType::Hazardous, 0.1), (WasteType::ElectronicWaste, 1.0)])
        );
        assert!(
            calculator
                .calculate_waste(Technology::Wind, Capacity(10.0))
                .is_empty()
        );
    }

    #[rstest]
    fn test_assess(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        let record = calculator
            .assess(Technology::NaturalGas, Energy(100.0), Capacity(10.0))
            .unwrap();
        assert_approx_eq!(f64, record.emissions, 40.0, epsilon = 1e-12);
        assert_approx_eq!(f64, record.water_use, 100.0, epsilon = 1e-12);
        assert_approx_eq!(f64, record.land_use, 0.5, epsilon = 1e-12);
        assert_eq!(record.air_pollutants.len(), 3);
        assert!(record.waste.is_empty());
    }

    #[rstest]
    fn test_avoided_impacts(model: Model) {
        let calculator = EnvironmentalCalculator::new(&model);
        let avoided = calculator
            .calculate_avoided_impacts(Energy(1000.0))
            .unwrap();
        assert_approx_eq!(f64, avoided.emissions, 400.0, epsilon = 1e-12);
        assert_approx_eq!(f64, avoided.water_use, 1000.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pollutant_names() {
        assert_eq!(Pollutant::PM25.to_string(), "PM2.5");
        assert_eq!(WasteType::ElectronicWaste.to_string(), "electronic_waste");
    }
}
