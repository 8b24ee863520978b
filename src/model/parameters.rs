//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{deserialise_parsed_keys, input_err_msg, is_sorted_and_unique, read_toml};
use crate::technology::Technology;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

/// The name of the file containing model parameters
pub const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

macro_rules! define_unit_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            <$type>::new($value)
        }
    };
}

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_start_year, u32, 2024);
define_param_default!(default_end_year, u32, 2050);
define_param_default!(default_seed, u64, 42);
define_unit_param_default!(default_capacity_factor_noise, Dimensionless, 0.05);

define_unit_param_default!(default_discount_rate, Dimensionless, 0.08);
define_unit_param_default!(default_inflation_rate, Dimensionless, 0.05);
define_unit_param_default!(default_opex_escalation, Dimensionless, 0.02);
define_param_default!(default_carbon_price, f64, 50.0);
define_param_default!(default_electricity_price, f64, 0.12);
define_unit_param_default!(default_learning_rate, Dimensionless, 0.2);
define_param_default!(default_learning_reference_year, u32, 2020);
define_param_default!(default_base_year, u32, 2024);

define_param_default!(default_base_load, f64, 12000.0);
define_param_default!(default_peak_load, f64, 18000.0);
define_unit_param_default!(default_annual_growth, Dimensionless, 0.06);
define_unit_param_default!(default_daily_variation, Dimensionless, 0.2);
define_unit_param_default!(default_seasonal_variation, Dimensionless, 0.15);

/// Fuel prices per MWh generated, in base-year currency
fn default_fuel_prices() -> IndexMap<Technology, f64> {
    IndexMap::from([
        (Technology::NaturalGas, 40.0),
        (Technology::Coal, 30.0),
        (Technology::Biomass, 20.0),
    ])
}

/// National renewable share targets
pub fn default_renewable_targets() -> IndexMap<u32, Dimensionless> {
    IndexMap::from([
        (2030, Dimensionless(0.15)),
        (2041, Dimensionless(0.40)),
        (2050, Dimensionless(1.0)),
    ])
}

/// Represents the contents of the entire model file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The first simulated year
    #[serde(default = "default_start_year")]
    pub start_year: u32,
    /// The last simulated year (inclusive)
    #[serde(default = "default_end_year")]
    pub end_year: u32,
    /// The granularity of the simulation clock
    #[serde(default)]
    pub time_resolution: TimeResolution,
    /// Seed for the capacity factor noise
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Standard deviation of the noise applied to capacity factors
    #[serde(default = "default_capacity_factor_noise")]
    pub capacity_factor_noise: Dimensionless,
    /// What to do when asked about a technology missing from the technology table
    #[serde(default)]
    pub unknown_technology_policy: UnknownTechnologyPolicy,
    /// Financial assumptions
    #[serde(default)]
    pub economics: EconomicParameters,
    /// National demand profile
    #[serde(default)]
    pub demand: DemandParameters,
    /// Renewable share targets, keyed by year
    #[serde(default = "default_renewable_targets")]
    #[serde(deserialize_with = "deserialise_parsed_keys")]
    pub renewable_targets: IndexMap<u32, Dimensionless>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            start_year: default_start_year(),
            end_year: default_end_year(),
            time_resolution: TimeResolution::default(),
            seed: default_seed(),
            capacity_factor_noise: default_capacity_factor_noise(),
            unknown_technology_policy: UnknownTechnologyPolicy::default(),
            economics: EconomicParameters::default(),
            demand: DemandParameters::default(),
            renewable_targets: default_renewable_targets(),
        }
    }
}

/// The `[economics]` section of the model file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EconomicParameters {
    /// Discount rate applied to future cash flows and generation
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Dimensionless,
    /// Annual inflation applied to capital costs after the base year
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: Dimensionless,
    /// Annual escalation of operating costs after the base year
    #[serde(default = "default_opex_escalation")]
    pub opex_escalation: Dimensionless,
    /// Price per tonne of CO2
    #[serde(default = "default_carbon_price")]
    pub carbon_price: f64,
    /// Electricity price per kWh, used to value generation
    #[serde(default = "default_electricity_price")]
    pub electricity_price: f64,
    /// Fuel price per MWh generated, for technologies which burn fuel
    #[serde(default = "default_fuel_prices")]
    #[serde(deserialize_with = "deserialise_parsed_keys")]
    pub fuel_prices: IndexMap<Technology, f64>,
    /// Fractional capex reduction for each two-year period after the reference year
    #[serde(default = "default_learning_rate")]
    pub learning_rate: Dimensionless,
    /// The year from which learning-curve reductions are counted
    #[serde(default = "default_learning_reference_year")]
    pub learning_reference_year: u32,
    /// The year in which costs are quoted
    #[serde(default = "default_base_year")]
    pub base_year: u32,
}

impl Default for EconomicParameters {
    fn default() -> Self {
        Self {
            discount_rate: default_discount_rate(),
            inflation_rate: default_inflation_rate(),
            opex_escalation: default_opex_escalation(),
            carbon_price: default_carbon_price(),
            electricity_price: default_electricity_price(),
            fuel_prices: default_fuel_prices(),
            learning_rate: default_learning_rate(),
            learning_reference_year: default_learning_reference_year(),
            base_year: default_base_year(),
        }
    }
}

/// The `[demand]` section of the model file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DemandParameters {
    /// National base load (MW) in the start year
    #[serde(default = "default_base_load")]
    pub base_load: f64,
    /// National peak load (MW) in the start year
    #[serde(default = "default_peak_load")]
    pub peak_load: f64,
    /// Annual demand growth rate
    #[serde(default = "default_annual_growth")]
    pub annual_growth: Dimensionless,
    /// Amplitude of the daily demand cycle
    #[serde(default = "default_daily_variation")]
    pub daily_variation: Dimensionless,
    /// Amplitude of the seasonal demand cycle
    #[serde(default = "default_seasonal_variation")]
    pub seasonal_variation: Dimensionless,
}

impl Default for DemandParameters {
    fn default() -> Self {
        Self {
            base_load: default_base_load(),
            peak_load: default_peak_load(),
            annual_growth: default_annual_growth(),
            daily_variation: default_daily_variation(),
            seasonal_variation: default_seasonal_variation(),
        }
    }
}

/// The granularity of the simulation clock
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum TimeResolution {
    /// One bucket per year
    #[default]
    #[string = "annual"]
    Annual,
    /// One bucket per hour (8760 per year)
    #[string = "hourly"]
    Hourly,
}

/// How to treat a technology which is not in the technology table
#[derive(DeserializeLabeledStringEnum, Debug, Clone, Copy, PartialEq, Default)]
pub enum UnknownTechnologyPolicy {
    /// Costs and impacts are zero
    #[default]
    #[string = "zero"]
    Zero,
    /// Raise an error
    #[string = "error"]
    Error,
}

/// Check that a rate is finite and greater than -1
fn check_rate(name: &str, value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value.value() > -1.0,
        "{name} must be a finite number greater than -1"
    );

    Ok(())
}

/// Check that a value is a proportion between 0 and 1
fn check_proportion(name: &str, value: Dimensionless) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value.value()),
        "{name} must be between 0 and 1"
    );

    Ok(())
}

/// Check that a price is finite and non-negative
fn check_price(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite, non-negative number"
    );

    Ok(())
}

impl EconomicParameters {
    /// Validate economic parameters
    pub fn validate(&self) -> Result<()> {
        check_rate("discount_rate", self.discount_rate)?;
        check_rate("inflation_rate", self.inflation_rate)?;
        check_rate("opex_escalation", self.opex_escalation)?;
        check_price("carbon_price", self.carbon_price)?;
        check_price("electricity_price", self.electricity_price)?;
        for (technology, price) in &self.fuel_prices {
            check_price(&format!("Fuel price for {technology}"), *price)?;
        }
        ensure!(
            (0.0..1.0).contains(&self.learning_rate.value()),
            "learning_rate must be at least 0 and less than 1"
        );

        Ok(())
    }
}

impl DemandParameters {
    /// Validate demand parameters
    pub fn validate(&self) -> Result<()> {
        check_price("base_load", self.base_load)?;
        ensure!(
            self.peak_load.is_finite() && self.peak_load >= self.base_load,
            "peak_load must be a finite number no less than base_load"
        );
        check_rate("annual_growth", self.annual_growth)?;
        check_proportion("daily_variation", self.daily_variation)?;
        check_proportion("seasonal_variation", self.seasonal_variation)?;

        Ok(())
    }
}

/// Check that the renewable targets are valid
pub fn check_renewable_targets(targets: &IndexMap<u32, Dimensionless>) -> Result<()> {
    let years: Vec<_> = targets.keys().copied().collect();
    ensure!(
        is_sorted_and_unique(&years),
        "Renewable target years must be unique and in order"
    );
    for (year, share) in targets {
        check_proportion(&format!("Renewable target for {year}"), *share)?;
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// The simulated years, in order
    pub fn years(&self) -> std::ops::RangeInclusive<u32> {
        self.start_year..=self.end_year
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.start_year <= self.end_year,
            "end_year ({}) must not be before start_year ({})",
            self.end_year,
            self.start_year
        );

        ensure!(
            self.capacity_factor_noise.is_finite() && self.capacity_factor_noise.value() >= 0.0,
            "capacity_factor_noise must be a finite, non-negative number"
        );

        if self.time_resolution == TimeResolution::Hourly {
            warn!(
                "Running at hourly resolution. This needs considerably more memory and time than \
                annual resolution."
            );
        }

        self.economics
            .validate()
            .context("Invalid [economics] parameters")?;
        self.demand
            .validate()
            .context("Invalid [demand] parameters")?;
        check_renewable_targets(&self.renewable_targets)?;

        Ok(())
    }
}
