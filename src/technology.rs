//! Generation technologies and their static techno-economic parameters.
use crate::units::{Capacity, Dimensionless, MoneyPerCapacity};
use anyhow::{Result, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The number of kW in one MW
const KW_PER_MW: f64 = 1000.0;

/// A map of [`TechnologySpec`]s, keyed by technology
pub type TechnologyMap = IndexMap<Technology, TechnologySpec>;

/// The closed set of technologies the model knows about
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Technology {
    /// Utility and rooftop solar photovoltaics
    SolarPv,
    /// Onshore and near-shore wind
    Wind,
    /// Biomass-fired generation
    Biomass,
    /// Gas-fired generation
    NaturalGas,
    /// Coal-fired generation
    Coal,
    /// Grid-scale batteries
    BatteryStorage,
}

impl Technology {
    /// Whether generation from this technology counts towards the renewable share
    pub fn is_renewable(self) -> bool {
        matches!(self, Self::SolarPv | Self::Wind | Self::Biomass)
    }

    /// Whether capital costs for this technology fall over time with the learning curve
    pub fn has_learning_curve(self) -> bool {
        matches!(
            self,
            Self::SolarPv | Self::Wind | Self::Biomass | Self::BatteryStorage
        )
    }
}

/// Techno-economic parameters for a single technology.
///
/// These are read once when the model is loaded. Scenario variants derive a new table rather
/// than changing this one.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TechnologySpec {
    /// Average output as a proportion of rated capacity
    pub capacity_factor: Dimensionless,
    /// Capital cost per kW of capacity
    pub capex: f64,
    /// Fixed operating cost per kW of capacity per year
    pub opex: f64,
    /// Economic lifetime in years
    pub lifetime: u32,
    /// Land use per unit of capacity
    pub land_use_factor: f64,
    /// Water consumption per MWh generated
    pub water_use_factor: f64,
    /// CO2 emissions per MWh generated (tonnes)
    pub emission_factor: f64,
    /// Direct jobs per MW of capacity
    pub employment_factor: f64,
}

impl TechnologySpec {
    /// Capital cost per MW of capacity
    pub fn capex_per_mw(&self) -> MoneyPerCapacity {
        MoneyPerCapacity(self.capex * KW_PER_MW)
    }

    /// Annual operating cost as a proportion of capital cost
    pub fn opex_rate(&self) -> Dimensionless {
        if self.capex == 0.0 {
            return Dimensionless(0.0);
        }

        Dimensionless(self.opex / self.capex)
    }
}

/// Check that the parameters for a technology are valid
pub fn check_technology_spec(technology: Technology, spec: &TechnologySpec) -> Result<()> {
    let cf = spec.capacity_factor.value();
    ensure!(
        (0.0..=1.0).contains(&cf),
        "Capacity factor for {technology} must be between 0 and 1 (got {cf})"
    );
    ensure!(
        spec.lifetime > 0,
        "Lifetime for {technology} must be greater than zero"
    );

    for (name, value) in [
        ("capex", spec.capex),
        ("opex", spec.opex),
        ("land_use_factor", spec.land_use_factor),
        ("water_use_factor", spec.water_use_factor),
        ("emission_factor", spec.emission_factor),
        ("employment_factor", spec.employment_factor),
    ] {
        ensure!(
            value.is_finite() && value >= 0.0,
            "{name} for {technology} must be a finite, non-negative number (got {value})"
        );
    }

    // Operating costs are a proportion of capital costs
    ensure!(
        spec.capex > 0.0 || spec.opex == 0.0,
        "opex for {technology} must be zero when capex is zero (got {})",
        spec.opex
    );

    Ok(())
}

/// The built-in technology table for Bangladesh
pub fn default_technologies() -> TechnologyMap {
    Technology::iter()
        .map(|technology| (technology, default_spec(technology)))
        .collect()
}

/// Built-in parameters for a single technology
fn default_spec(technology: Technology) -> TechnologySpec {
    // capacity factor, capex, opex, lifetime, land, water, emissions, employment
    let (cf, capex, opex, lifetime, land, water, emissions, jobs) = match technology {
        Technology::SolarPv => (0.18, 800.0, 15.0, 25, 2.5, 0.0, 0.0, 0.5),
        Technology::Wind => (0.25, 1200.0, 30.0, 20, 0.5, 0.0, 0.0, 0.3),
        Technology::Biomass => (0.70, 2500.0, 100.0, 20, 0.1, 1.5, 0.0, 1.0),
        Technology::NaturalGas => (0.85, 1000.0, 50.0, 25, 0.05, 1.0, 0.4, 0.2),
        Technology::Coal => (0.80, 2000.0, 80.0, 30, 0.1, 2.0, 0.8, 0.4),
        Technology::BatteryStorage => (0.15, 300.0, 10.0, 10, 0.1, 0.0, 0.0, 0.1),
    };

    TechnologySpec {
        capacity_factor: Dimensionless(cf),
        capex,
        opex,
        lifetime,
        land_use_factor: land,
        water_use_factor: water,
        emission_factor: emissions,
        employment_factor: jobs,
    }
}

/// The built-in installed capacity at the start of the simulation
pub fn default_initial_capacity() -> IndexMap<Technology, Capacity> {
    IndexMap::from([(Technology::SolarPv, Capacity(946.0))])
}
