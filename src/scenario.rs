//! Scenarios are named variants of a model, each simulated over the whole horizon.
//!
//! A scenario never changes the model it is given. It builds a modified copy, runs the energy
//! system on that copy and collects one row of results per simulated year.
use crate::energy_system::EnergySystem;
use crate::environment::{EnvironmentalCalculator, Pollutant, WasteType};
use crate::finance::CostCalculator;
use crate::id::define_id_type;
use crate::model::{Model, default_renewable_targets};
use crate::technology::Technology;
use crate::units::{Capacity, Dimensionless, Energy, Money, MoneyPerEnergy};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use strum::{Display, EnumIter};

define_id_type! {ScenarioID}

/// The multiplier applied to renewable costs in the accelerated and delayed scenarios
const ACCELERATED_COST_MULTIPLIER: f64 = 0.8;
const DELAYED_COST_MULTIPLIER: f64 = 1.2;

/// A named set of changes to a model
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDefinition {
    /// Unique name for the scenario
    pub id: ScenarioID,
    /// A longer description
    pub description: String,
    /// Replacement renewable share targets, if any
    pub renewable_targets: Option<IndexMap<u32, Dimensionless>>,
    /// Multipliers for technologies' capital costs
    pub capex_multipliers: IndexMap<Technology, Dimensionless>,
    /// Multipliers for technologies' operating costs
    pub opex_multipliers: IndexMap<Technology, Dimensionless>,
    /// Replacement seed for the capacity factor noise, if any
    pub seed: Option<u64>,
}

impl ScenarioDefinition {
    /// A scenario which leaves the model unchanged
    pub fn baseline() -> Self {
        Self {
            id: "baseline".into(),
            description: "Current policies and costs".to_string(),
            renewable_targets: None,
            capex_multipliers: IndexMap::new(),
            opex_multipliers: IndexMap::new(),
            seed: None,
        }
    }

    /// Higher targets and cheaper renewables
    pub fn accelerated() -> Self {
        Self::with_renewable_costs(
            "accelerated",
            "Accelerated transition with cheaper renewables",
            [0.25, 0.60, 1.0],
            ACCELERATED_COST_MULTIPLIER,
        )
    }

    /// Lower targets and dearer renewables
    pub fn delayed() -> Self {
        Self::with_renewable_costs(
            "delayed",
            "Delayed transition with dearer renewables",
            [0.10, 0.30, 0.80],
            DELAYED_COST_MULTIPLIER,
        )
    }

    /// The scenarios used when a model doesn't define its own
    pub fn builtin() -> Vec<Self> {
        vec![Self::baseline(), Self::accelerated(), Self::delayed()]
    }

    fn with_renewable_costs(id: &str, description: &str, targets: [f64; 3], multiplier: f64) -> Self {
        let renewable_targets = default_renewable_targets()
            .keys()
            .zip(targets)
            .map(|(year, share)| (*year, Dimensionless(share)))
            .collect();
        let multipliers: IndexMap<_, _> = [Technology::SolarPv, Technology::Wind, Technology::Biomass]
            .into_iter()
            .map(|technology| (technology, Dimensionless(multiplier)))
            .collect();

        Self {
            id: id.into(),
            description: description.to_string(),
            renewable_targets: Some(renewable_targets),
            capex_multipliers: multipliers.clone(),
            opex_multipliers: multipliers,
            seed: None,
        }
    }

    /// Check that the scenario's multipliers are valid
    pub fn validate(&self) -> Result<()> {
        for (kind, multipliers) in [
            ("capex", &self.capex_multipliers),
            ("opex", &self.opex_multipliers),
        ] {
            for (technology, multiplier) in multipliers {
                ensure!(
                    multiplier.is_finite() && multiplier.value() > 0.0,
                    "Scenario {}: {kind} multiplier for {technology} must be greater than zero",
                    self.id
                );
            }
        }

        Ok(())
    }

    /// Human-readable descriptions of the changes this scenario makes
    pub fn modifications(&self) -> Vec<String> {
        let mut modifications = Vec::new();
        if let Some(targets) = &self.renewable_targets {
            let targets = targets
                .iter()
                .map(|(year, share)| format!("{year}: {share}"))
                .collect::<Vec<_>>()
                .join(", ");
            modifications.push(format!("renewable targets {{{targets}}}"));
        }
        for (technology, multiplier) in &self.capex_multipliers {
            modifications.push(format!("{technology} capex x{multiplier}"));
        }
        for (technology, multiplier) in &self.opex_multipliers {
            modifications.push(format!("{technology} opex x{multiplier}"));
        }
        if let Some(seed) = self.seed {
            modifications.push(format!("seed {seed}"));
        }

        modifications
    }

    /// Build the variant of `base` described by this scenario.
    ///
    /// `base` itself is left untouched.
    pub fn apply(&self, base: &Model) -> Result<Model> {
        self.validate()?;

        let mut model = base.clone();
        if let Some(targets) = &self.renewable_targets {
            model.parameters.renewable_targets = targets.clone();
        }

        for (technology, multiplier) in &self.capex_multipliers {
            let spec = model.technologies.get_mut(technology).with_context(|| {
                format!(
                    "Scenario {} changes {technology}, which is not in the technology table",
                    self.id
                )
            })?;
            spec.capex *= multiplier.value();
        }

        for (technology, multiplier) in &self.opex_multipliers {
            let spec = model.technologies.get_mut(technology).with_context(|| {
                format!(
                    "Scenario {} changes {technology}, which is not in the technology table",
                    self.id
                )
            })?;
            spec.opex *= multiplier.value();
        }

        if let Some(seed) = self.seed {
            model.parameters.seed = seed;
        }

        model
            .validate()
            .with_context(|| format!("Invalid model for scenario {}", self.id))?;

        Ok(model)
    }

    /// Build this scenario's variant of `base` and simulate it
    pub fn run(&self, base: &Model) -> Result<ScenarioResult> {
        info!("Running scenario {}: {}", self.id, self.description);
        let model = self.apply(base)?;
        let run = simulate_model(&model)?;
        let targets = assess_targets(&model, &run.annual, &self.id);

        if let Some(last) = run.annual.last() {
            info!(
                "Scenario {} complete: renewable share in {} is {:.1}%",
                self.id,
                last.year,
                last.renewable_share.value() * 100.0
            );
        }

        Ok(ScenarioResult {
            scenario_id: self.id.clone(),
            description: self.description.clone(),
            modifications: self.modifications(),
            seed: model.parameters.seed,
            annual: run.annual,
            technologies: run.technologies,
            targets,
        })
    }
}

/// National results for a single year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualResult {
    /// The year
    pub year: u32,
    /// Proportion of generation from renewables
    pub renewable_share: Dimensionless,
    /// Installed capacity at the end of the year (MW)
    pub total_capacity: Capacity,
    /// Generation over the year (MWh)
    pub total_generation: Energy,
    /// CO2 emissions (tonnes)
    pub emissions: f64,
    /// Capital cost of the installed fleet at this year's prices
    pub investment: Money,
    /// Unweighted mean LCOE across technologies with some capacity
    pub lcoe: MoneyPerEnergy,
    /// Water consumption
    pub water_use: f64,
    /// Land use
    pub land_use: f64,
    /// Direct jobs
    pub employment: f64,
    /// CO2 emissions avoided by renewable generation displacing gas (tonnes)
    pub avoided_emissions: f64,
    /// Water consumption avoided by renewable generation displacing gas
    pub avoided_water_use: f64,
}

/// The quantities reported for each year, used to summarise sensitivity runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// See [`AnnualResult::renewable_share`]
    RenewableShare,
    /// See [`AnnualResult::total_capacity`]
    TotalCapacity,
    /// See [`AnnualResult::total_generation`]
    TotalGeneration,
    /// See [`AnnualResult::emissions`]
    Emissions,
    /// See [`AnnualResult::investment`]
    Investment,
    /// See [`AnnualResult::lcoe`]
    Lcoe,
    /// See [`AnnualResult::water_use`]
    WaterUse,
    /// See [`AnnualResult::land_use`]
    LandUse,
    /// See [`AnnualResult::employment`]
    Employment,
    /// See [`AnnualResult::avoided_emissions`]
    AvoidedEmissions,
    /// See [`AnnualResult::avoided_water_use`]
    AvoidedWaterUse,
}

impl AnnualResult {
    /// Get the value of a metric
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RenewableShare => self.renewable_share.value(),
            Metric::TotalCapacity => self.total_capacity.value(),
            Metric::TotalGeneration => self.total_generation.value(),
            Metric::Emissions => self.emissions,
            Metric::Investment => self.investment.value(),
            Metric::Lcoe => self.lcoe.value(),
            Metric::WaterUse => self.water_use,
            Metric::LandUse => self.land_use,
            Metric::Employment => self.employment,
            Metric::AvoidedEmissions => self.avoided_emissions,
            Metric::AvoidedWaterUse => self.avoided_water_use,
        }
    }
}

/// Detailed results for one technology in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnologyResult {
    /// The year
    pub year: u32,
    /// The technology
    pub technology: Technology,
    /// Installed capacity at the end of the year (MW)
    pub capacity: Capacity,
    /// Generation over the year (MWh)
    pub generation: Energy,
    /// Capital cost of the installed capacity
    pub capex: Money,
    /// Annual operating cost
    pub annual_opex: Money,
    /// Levelised cost of electricity
    pub lcoe: MoneyPerEnergy,
    /// Net present value
    pub npv: Money,
    /// Internal rate of return, if defined
    pub irr: Option<Dimensionless>,
    /// Payback period in years, if the investment is recovered
    pub payback_period: Option<u32>,
    /// Revenue from selling the generation
    pub annual_revenue: Money,
    /// Revenue less operating cost
    pub annual_cash_flow: Money,
    /// Cost of fuel burned
    pub fuel_cost: Money,
    /// Cost of CO2 emitted
    pub carbon_cost: Money,
    /// CO2 emissions (tonnes)
    pub emissions: f64,
    /// Water consumption
    pub water_use: f64,
    /// Land use
    pub land_use: f64,
    /// Sulphur dioxide (kg)
    pub so2: f64,
    /// Nitrogen oxides (kg)
    pub nox: f64,
    /// Fine particulates (kg)
    pub pm25: f64,
    /// Health impact of sulphur dioxide emissions
    pub so2_health_impact: f64,
    /// Health impact of nitrogen oxide emissions
    pub nox_health_impact: f64,
    /// Health impact of fine particulate emissions
    pub pm25_health_impact: f64,
    /// Combustion ash (tonnes)
    pub ash: f64,
    /// Treatment sludge (tonnes)
    pub sludge: f64,
    /// Hazardous waste (tonnes)
    pub hazardous_waste: f64,
    /// Electronic waste (tonnes)
    pub electronic_waste: f64,
}

/// Progress towards a renewable share target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetAssessment {
    /// The target year
    pub year: u32,
    /// The target renewable share
    pub target: Dimensionless,
    /// The renewable share achieved
    pub achieved: Dimensionless,
    /// Whether the target was met
    pub met: bool,
}

/// The results of running a single scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioResult {
    /// The scenario which was run
    pub scenario_id: ScenarioID,
    /// The scenario's description
    pub description: String,
    /// The changes made to the model
    pub modifications: Vec<String>,
    /// The seed the capacity factor noise was drawn with
    pub seed: u64,
    /// One row per simulated year
    pub annual: Vec<AnnualResult>,
    /// One row per year and technology with some capacity
    pub technologies: Vec<TechnologyResult>,
    /// Progress towards each renewable target within the simulated years
    pub targets: Vec<TargetAssessment>,
}

/// The yearly results of simulating a model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRun {
    /// One row per simulated year
    pub annual: Vec<AnnualResult>,
    /// One row per year and technology with some capacity
    pub technologies: Vec<TechnologyResult>,
}

/// Simulate every year of a model, appraising costs and impacts each year.
///
/// The model's seed drives the capacity factor noise, so the same model always gives the same
/// results.
pub fn simulate_model(model: &Model) -> Result<ModelRun> {
    let mut system = EnergySystem::new(model, model.parameters.seed)?;
    let costs = CostCalculator::new(model);
    let environment = EnvironmentalCalculator::new(model);

    let mut annual = Vec::new();
    let mut technologies = Vec::new();
    for summary in system.simulate(model.parameters.years())? {
        let year = summary.year;

        let mut investment = Money(0.0);
        let mut lcoe_sum = MoneyPerEnergy(0.0);
        let mut lcoe_count = 0u32;
        let mut emissions = 0.0;
        let mut water_use = 0.0;
        let mut land_use = 0.0;
        let mut employment = 0.0;
        let mut renewable_generation = Energy(0.0);
        for (technology, capacity) in &summary.capacity_by_technology {
            let generation = summary
                .generation_by_technology
                .get(technology)
                .copied()
                .unwrap_or_default();

            let tech_emissions = environment.calculate_emissions(*technology, generation)?;
            emissions += tech_emissions;
            water_use += environment.calculate_water_use(*technology, generation)?;
            land_use += environment.calculate_land_use(*technology, *capacity)?;
            employment += environment.calculate_employment(*technology, *capacity)?;
            if technology.is_renewable() {
                renewable_generation += generation;
            }

            if *capacity <= Capacity(0.0) {
                continue;
            }

            // Capacity which generated nothing still counts as investment, but has no LCOE
            if generation <= Energy(0.0) {
                investment += costs.calculate_capex(*technology, *capacity, year)?;
                debug!("{technology} generated nothing in {year}; skipping appraisal");
                continue;
            }

            let record = costs
                .analyze_investment(*technology, *capacity, generation, year)
                .with_context(|| format!("Could not appraise {technology} in {year}"))?;
            investment += record.capex;
            lcoe_sum += record.lcoe;
            lcoe_count += 1;

            let impacts = environment.assess(*technology, generation, *capacity)?;
            let waste = |waste_type: WasteType| {
                impacts.waste.get(&waste_type).copied().unwrap_or_default()
            };
            technologies.push(TechnologyResult {
                year,
                technology: *technology,
                capacity: *capacity,
                generation,
                capex: record.capex,
                annual_opex: record.annual_opex,
                lcoe: record.lcoe,
                npv: record.npv,
                irr: record.irr,
                payback_period: record.payback_period,
                annual_revenue: record.annual_revenue,
                annual_cash_flow: record.annual_cash_flow,
                fuel_cost: costs.calculate_fuel_cost(*technology, generation, year),
                carbon_cost: costs.calculate_carbon_cost(tech_emissions),
                emissions: impacts.emissions,
                water_use: impacts.water_use,
                land_use: impacts.land_use,
                so2: impacts.air_pollutants[&Pollutant::SO2],
                nox: impacts.air_pollutants[&Pollutant::NOx],
                pm25: impacts.air_pollutants[&Pollutant::PM25],
                so2_health_impact: impacts.health_impacts[&Pollutant::SO2],
                nox_health_impact: impacts.health_impacts[&Pollutant::NOx],
                pm25_health_impact: impacts.health_impacts[&Pollutant::PM25],
                ash: waste(WasteType::Ash),
                sludge: waste(WasteType::Sludge),
                hazardous_waste: waste(WasteType::Hazardous),
                electronic_waste: waste(WasteType::ElectronicWaste),
            });
        }

        let lcoe = if lcoe_count > 0 {
            lcoe_sum / Dimensionless(f64::from(lcoe_count))
        } else {
            MoneyPerEnergy(0.0)
        };

        let avoided = environment.calculate_avoided_impacts(renewable_generation)?;
        annual.push(AnnualResult {
            year,
            renewable_share: summary.renewable_share,
            total_capacity: summary.total_capacity,
            total_generation: summary.total_generation,
            emissions,
            investment,
            lcoe,
            water_use,
            land_use,
            employment,
            avoided_emissions: avoided.emissions,
            avoided_water_use: avoided.water_use,
        });
    }

    Ok(ModelRun {
        annual,
        technologies,
    })
}

/// Compare the renewable share achieved in each target year with the target
fn assess_targets(
    model: &Model,
    annual: &[AnnualResult],
    scenario_id: &ScenarioID,
) -> Vec<TargetAssessment> {
    model
        .parameters
        .renewable_targets
        .iter()
        .filter_map(|(year, target)| {
            let row = annual.iter().find(|row| row.year == *year)?;
            let met = row.renewable_share >= *target;
            if !met {
                warn!(
                    "Scenario {scenario_id}: renewable target for {year} missed ({:.1}% achieved, \
                    {:.1}% targeted)",
                    row.renewable_share.value() * 100.0,
                    target.value() * 100.0
                );
            }

            Some(TargetAssessment {
                year: *year,
                target: *target,
                achieved: row.renewable_share,
                met,
            })
        })
        .collect()
}

/// Run each scenario against the same base model
pub fn run_scenarios(base: &Model, scenarios: &[ScenarioDefinition]) -> Result<Vec<ScenarioResult>> {
    scenarios.iter().map(|scenario| scenario.run(base)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, model, short_model};
    use float_cmp::assert_approx_eq;
    use itertools::Itertools;
    use rstest::rstest;

    #[test]
    fn test_builtin_scenarios() {
        let scenarios = ScenarioDefinition::builtin();
        let ids: Vec<_> = scenarios.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, ["baseline", "accelerated", "delayed"]);

        let accelerated = &scenarios[1];
        assert_eq!(
            accelerated.renewable_targets.as_ref().unwrap()[&2041],
            Dimensionless(0.60)
        );
        assert_eq!(
            accelerated.capex_multipliers[&Technology::Wind],
            Dimensionless(0.8)
        );
        assert!(!accelerated.capex_multipliers.contains_key(&Technology::Coal));
    }

    #[rstest]
    fn test_apply_leaves_base_untouched(model: Model) {
        let original = model.clone();
        let variant = ScenarioDefinition::accelerated().apply(&model).unwrap();

        assert_eq!(model.technologies, original.technologies);
        assert_eq!(model.parameters, original.parameters);
        assert_approx_eq!(
            f64,
            variant.technologies[&Technology::SolarPv].capex,
            640.0,
            epsilon = 1e-9
        );
        assert_eq!(variant.technologies[&Technology::Coal].capex, 2000.0);
        assert_eq!(
            variant.parameters.renewable_targets[&2030],
            Dimensionless(0.25)
        );
    }

    #[rstest]
    fn test_apply_unknown_technology(mut model: Model) {
        model.technologies.shift_remove(&Technology::Biomass);
        assert_error!(
            ScenarioDefinition::delayed().apply(&model),
            "Scenario delayed changes biomass, which is not in the technology table"
        );
    }

    #[rstest]
    fn test_apply_bad_multiplier(model: Model) {
        let mut scenario = ScenarioDefinition::baseline();
        scenario
            .opex_multipliers
            .insert(Technology::Coal, Dimensionless(0.0));
        assert_error!(
            scenario.apply(&model),
            "Scenario baseline: opex multiplier for coal must be greater than zero"
        );
    }

    #[test]
    fn test_modifications() {
        let mut scenario = ScenarioDefinition::baseline();
        assert!(scenario.modifications().is_empty());

        scenario
            .capex_multipliers
            .insert(Technology::Wind, Dimensionless(0.5));
        scenario.seed = Some(3);
        assert_eq!(scenario.modifications(), ["wind capex x0.5", "seed 3"]);
    }

    #[rstest]
    fn test_simulate_model(model: Model) {
        let run = simulate_model(&model).unwrap();
        assert_eq!(run.annual.len(), 27);
        assert_eq!(run.annual[0].year, 2024);
        assert_eq!(run.annual[26].year, 2050);

        // Only solar is installed in the built-in model
        for row in &run.annual {
            assert_eq!(row.renewable_share, Dimensionless(1.0));
            assert_eq!(row.emissions, 0.0);
            assert_approx_eq!(f64, row.employment, 946.0 * 0.5, epsilon = 1e-9);
            assert_approx_eq!(f64, row.land_use, 946.0 * 2.5, epsilon = 1e-9);
            assert!(row.lcoe > MoneyPerEnergy(0.0));
        }
        assert!(run.technologies.iter().all(|t| t.technology == Technology::SolarPv));
        assert_eq!(run.technologies.len(), 27);
    }

    #[rstest]
    fn test_simulate_model_mixed(short_model: Model) {
        let run = simulate_model(&short_model).unwrap();
        assert_eq!(run.annual.len(), 7);
        assert!(
            run.annual
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.total_capacity <= b.total_capacity)
        );
        for row in &run.annual {
            assert!(row.renewable_share >= Dimensionless(0.0));
            assert!(row.renewable_share <= Dimensionless(1.0));
            assert!(row.emissions > 0.0);
        }

        let gas = run
            .technologies
            .iter()
            .find(|t| t.technology == Technology::NaturalGas)
            .unwrap();
        assert!(gas.fuel_cost > Money(0.0));
        assert!(gas.carbon_cost > Money(0.0));
        assert!(gas.nox > 0.0);
    }

    #[rstest]
    fn test_simulate_model_idle_technology(mut short_model: Model) {
        short_model.parameters.capacity_factor_noise = Dimensionless(0.0);
        short_model
            .technologies
            .get_mut(&Technology::Wind)
            .unwrap()
            .capacity_factor = Dimensionless(0.0);
        let run = simulate_model(&short_model).unwrap();

        // Wind is built in 2027 but never generates, so it is not appraised
        assert!(
            run.technologies
                .iter()
                .all(|t| t.technology != Technology::Wind)
        );
        let with_wind = run.annual.iter().find(|row| row.year == 2027).unwrap();
        let without_wind = run.annual.iter().find(|row| row.year == 2026).unwrap();
        assert!(with_wind.investment > without_wind.investment);
        assert!(with_wind.lcoe > MoneyPerEnergy(0.0));
    }

    #[rstest]
    fn test_simulate_model_health_waste_and_avoided(short_model: Model) {
        let run = simulate_model(&short_model).unwrap();

        let coal = run
            .technologies
            .iter()
            .find(|t| t.technology == Technology::Coal)
            .unwrap();
        assert_approx_eq!(f64, coal.ash, coal.capacity.value() * 100.0, epsilon = 1e-6);
        assert_approx_eq!(f64, coal.hazardous_waste, coal.capacity.value(), epsilon = 1e-6);
        assert_eq!(coal.electronic_waste, 0.0);
        assert_approx_eq!(
            f64,
            coal.pm25_health_impact,
            coal.pm25 / 1000.0 * 0.1,
            epsilon = 1e-9
        );

        let solar = run
            .technologies
            .iter()
            .find(|t| t.technology == Technology::SolarPv)
            .unwrap();
        assert_eq!(solar.so2_health_impact, 0.0);
        assert_approx_eq!(f64, solar.electronic_waste, solar.capacity.value() * 0.1, epsilon = 1e-6);

        // Avoided impacts are what gas would have emitted for the renewable generation
        let gas = &short_model.technologies[&Technology::NaturalGas];
        for year in short_model.parameters.years() {
            let row = run.annual.iter().find(|row| row.year == year).unwrap();
            let renewable_generation: f64 = run
                .technologies
                .iter()
                .filter(|t| t.year == year && t.technology.is_renewable())
                .map(|t| t.generation.value())
                .sum();
            assert_approx_eq!(
                f64,
                row.avoided_emissions,
                renewable_generation * gas.emission_factor,
                epsilon = 1e-3
            );
            assert_approx_eq!(
                f64,
                row.avoided_water_use,
                renewable_generation * gas.water_use_factor,
                epsilon = 1e-3
            );
        }
    }

    #[rstest]
    fn test_simulate_model_reproducible(short_model: Model) {
        assert_eq!(
            simulate_model(&short_model).unwrap(),
            simulate_model(&short_model).unwrap()
        );
    }

    #[rstest]
    fn test_run_scenario_targets(short_model: Model) {
        let result = ScenarioDefinition::baseline().run(&short_model).unwrap();
        assert_eq!(result.scenario_id, ScenarioID::from("baseline"));
        assert_eq!(result.annual.len(), 7);
        assert_eq!(result.seed, short_model.parameters.seed);

        // Only the 2030 target is inside 2024-2030
        assert_eq!(result.targets.len(), 1);
        let target = &result.targets[0];
        assert_eq!(target.year, 2030);
        assert_eq!(target.target, Dimensionless(0.15));
        assert_eq!(target.met, target.achieved >= target.target);
    }

    #[rstest]
    fn test_run_scenario_seed(short_model: Model) {
        let mut scenario = ScenarioDefinition::baseline();
        scenario.seed = Some(7);
        let result = scenario.run(&short_model).unwrap();
        assert_eq!(result.seed, 7);
        assert_eq!(result.modifications, ["seed 7"]);
    }

    #[rstest]
    fn test_run_scenarios(short_model: Model) {
        let results = run_scenarios(&short_model, &ScenarioDefinition::builtin()).unwrap();
        assert_eq!(results.len(), 3);

        // Scenarios only change costs and targets, so physical results are identical
        assert_eq!(results[0].annual[6].total_generation, results[1].annual[6].total_generation);
        assert!(results[1].annual[6].investment < results[0].annual[6].investment);
        assert!(results[2].annual[6].investment > results[0].annual[6].investment);
    }
}
