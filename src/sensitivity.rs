//! Sensitivity analysis: how results in one year respond to changes in a single input.
//!
//! Each value of each parameter is applied to its own copy of the base model, so no change
//! carries over into another run.
use crate::model::Model;
use crate::scenario::{AnnualResult, Metric, simulate_model};
use crate::technology::{Technology, TechnologySpec};
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use log::info;
use serde::Serialize;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// An input which can be varied in a sensitivity analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    /// The discount rate for present values
    DiscountRate,
    /// General inflation
    InflationRate,
    /// Annual growth in operating costs
    OpexEscalation,
    /// Cost per tonne of CO2
    CarbonPrice,
    /// Sale price of electricity
    ElectricityPrice,
    /// Capital cost of solar PV
    SolarCapex,
    /// Capital cost of wind
    WindCapex,
    /// Capital cost of biomass
    BiomassCapex,
    /// Mean capacity factor of solar PV
    SolarCapacityFactor,
    /// Mean capacity factor of wind
    WindCapacityFactor,
    /// Mean capacity factor of biomass
    BiomassCapacityFactor,
}

impl SensitivityParameter {
    /// Look up a parameter by name
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_str(name).ok().with_context(|| {
            format!(
                "Unknown sensitivity parameter {name}. Valid parameters are: {}",
                Self::iter().join(", ")
            )
        })
    }

    /// Build a copy of `base` with this parameter set to `value`.
    ///
    /// `base` itself is left untouched.
    pub fn apply(self, base: &Model, value: f64) -> Result<Model> {
        ensure!(value.is_finite(), "Value for {self} must be finite (got {value})");

        let mut model = base.clone();
        match self {
            Self::DiscountRate => model.parameters.economics.discount_rate = Dimensionless(value),
            Self::InflationRate => model.parameters.economics.inflation_rate = Dimensionless(value),
            Self::OpexEscalation => {
                model.parameters.economics.opex_escalation = Dimensionless(value);
            }
            Self::CarbonPrice => model.parameters.economics.carbon_price = value,
            Self::ElectricityPrice => model.parameters.economics.electricity_price = value,
            Self::SolarCapex => technology_spec(&mut model, Technology::SolarPv)?.capex = value,
            Self::WindCapex => technology_spec(&mut model, Technology::Wind)?.capex = value,
            Self::BiomassCapex => technology_spec(&mut model, Technology::Biomass)?.capex = value,
            Self::SolarCapacityFactor => {
                technology_spec(&mut model, Technology::SolarPv)?.capacity_factor =
                    Dimensionless(value);
            }
            Self::WindCapacityFactor => {
                technology_spec(&mut model, Technology::Wind)?.capacity_factor =
                    Dimensionless(value);
            }
            Self::BiomassCapacityFactor => {
                technology_spec(&mut model, Technology::Biomass)?.capacity_factor =
                    Dimensionless(value);
            }
        }

        model
            .validate()
            .with_context(|| format!("Invalid value {value} for {self}"))?;

        Ok(model)
    }
}

fn technology_spec(model: &mut Model, technology: Technology) -> Result<&mut TechnologySpec> {
    model
        .technologies
        .get_mut(&technology)
        .with_context(|| format!("{technology} is not in the technology table"))
}

/// A parameter and the values to try for it
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityCase {
    /// The parameter to vary
    pub parameter: SensitivityParameter,
    /// The values to try, in order
    pub values: Vec<f64>,
}

/// The parameters varied when none are given explicitly
pub fn default_sweep() -> Vec<SensitivityCase> {
    [
        (SensitivityParameter::DiscountRate, [0.05, 0.08, 0.12]),
        (SensitivityParameter::CarbonPrice, [20.0, 50.0, 100.0]),
        (SensitivityParameter::SolarCapex, [600.0, 800.0, 1000.0]),
        (SensitivityParameter::WindCapex, [900.0, 1200.0, 1500.0]),
        (SensitivityParameter::SolarCapacityFactor, [0.15, 0.18, 0.21]),
        (SensitivityParameter::WindCapacityFactor, [0.20, 0.25, 0.30]),
    ]
    .into_iter()
    .map(|(parameter, values)| SensitivityCase {
        parameter,
        values: values.to_vec(),
    })
    .collect()
}

/// The results for the target year of one sensitivity run
#[derive(Debug, Clone, PartialEq)]
pub struct SensitivityRow {
    /// The parameter which was varied
    pub parameter: SensitivityParameter,
    /// The value it was given
    pub value: f64,
    /// Results for the target year
    pub result: AnnualResult,
}

/// Run the model once for each value of each parameter and report results for `target_year`
pub fn run_sensitivity(
    base: &Model,
    cases: &[SensitivityCase],
    target_year: u32,
) -> Result<Vec<SensitivityRow>> {
    let params = &base.parameters;
    ensure!(
        params.years().contains(&target_year),
        "Target year {target_year} is outside the simulated years ({}-{})",
        params.start_year,
        params.end_year
    );

    let mut rows = Vec::new();
    for case in cases {
        info!(
            "Varying {} over {} values",
            case.parameter,
            case.values.len()
        );
        for value in &case.values {
            let model = case.parameter.apply(base, *value)?;
            let run = simulate_model(&model).with_context(|| {
                format!("Sensitivity run failed for {} = {value}", case.parameter)
            })?;
            let result = run
                .annual
                .into_iter()
                .find(|row| row.year == target_year)
                .with_context(|| format!("No results for {target_year}"))?;

            rows.push(SensitivityRow {
                parameter: case.parameter,
                value: *value,
                result,
            });
        }
    }

    Ok(rows)
}

/// How one metric varied as one parameter was changed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityStatistics {
    /// The parameter which was varied
    pub parameter: SensitivityParameter,
    /// The metric summarised
    pub metric: Metric,
    /// Smallest value of the metric
    pub min: f64,
    /// Largest value of the metric
    pub max: f64,
    /// `max - min`
    pub range: f64,
    /// Mean value of the metric
    pub mean: f64,
    /// Pearson correlation between parameter and metric, if both varied
    pub correlation: Option<f64>,
}

/// Summarise every metric for every parameter in `rows`
pub fn calculate_statistics(rows: &[SensitivityRow]) -> Vec<SensitivityStatistics> {
    let mut by_parameter: IndexMap<SensitivityParameter, Vec<&SensitivityRow>> = IndexMap::new();
    for row in rows {
        by_parameter.entry(row.parameter).or_default().push(row);
    }

    let mut statistics = Vec::new();
    for (parameter, rows) in by_parameter {
        let values: Vec<_> = rows.iter().map(|row| row.value).collect();
        for metric in Metric::iter() {
            let results: Vec<_> = rows.iter().map(|row| row.result.metric(metric)).collect();
            let min = results.iter().copied().fold(f64::INFINITY, f64::min);
            let max = results.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            statistics.push(SensitivityStatistics {
                parameter,
                metric,
                min,
                max,
                range: max - min,
                mean: results.iter().sum::<f64>() / results.len() as f64,
                correlation: pearson_correlation(&values, &results),
            });
        }
    }

    statistics
}

/// Pearson correlation coefficient of two equal-length series.
///
/// `None` if there are fewer than two points or either series is constant.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 || is_constant(xs) || is_constant(ys) {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    Some(sxy / (sxx * syy).sqrt())
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all_equal()
}
