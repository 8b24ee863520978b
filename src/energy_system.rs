//! The mutable state of the electricity system over the simulation horizon.
//!
//! Capacity and generation are stored as one series per (technology, region) pair, indexed by the
//! buckets of a [`TimeIndex`]. Capacity is a step function: once added, it is present in every
//! later bucket. There is no retirement.
use crate::model::Model;
use crate::region::RegionID;
use crate::technology::Technology;
use crate::units::{Capacity, Dimensionless, Energy};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::ops::RangeInclusive;

pub mod demand;
use demand::DemandSeries;
pub mod time_index;
use time_index::TimeIndex;

/// A key identifying one capacity or generation series
type SeriesKey = (Technology, RegionID);

/// A set of series, one per (technology, region) pair
type SeriesMap = IndexMap<SeriesKey, Vec<f64>>;

/// National totals for a single simulated year
#[derive(Debug, Clone, PartialEq)]
pub struct AnnualSummary {
    /// The year summarised
    pub year: u32,
    /// Installed capacity at the end of the year
    pub total_capacity: Capacity,
    /// Energy generated over the year
    pub total_generation: Energy,
    /// Energy demanded over the year
    pub total_demand: Energy,
    /// Proportion of generation from renewable technologies
    pub renewable_share: Dimensionless,
    /// Installed capacity at the end of the year, per technology
    pub capacity_by_technology: IndexMap<Technology, Capacity>,
    /// Energy generated over the year, per technology
    pub generation_by_technology: IndexMap<Technology, Energy>,
}

/// Draw from a standard normal distribution
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Installed capacity, generation and demand for every technology, region and time bucket
pub struct EnergySystem<'a> {
    model: &'a Model,
    time_index: TimeIndex,
    capacity: SeriesMap,
    generation: SeriesMap,
    demand: DemandSeries,
    rng: StdRng,
}

impl<'a> EnergySystem<'a> {
    /// Set up the energy system for a model.
    ///
    /// Every (technology, region) pair starts with zero capacity and generation. The model's
    /// initial capacity is then split between regions and present from the first year, and its
    /// planned additions are applied.
    ///
    /// # Arguments
    ///
    /// * `model` - The model to simulate
    /// * `seed` - Seed for the capacity factor noise
    pub fn new(model: &'a Model, seed: u64) -> Result<Self> {
        model.validate().context("Invalid model")?;

        let params = &model.parameters;
        let time_index = TimeIndex::new(params.start_year, params.end_year, params.time_resolution);
        let len = time_index.len();
        let capacity: SeriesMap = model
            .technologies
            .keys()
            .flat_map(|technology| {
                model
                    .regions
                    .keys()
                    .map(move |region_id| ((*technology, region_id.clone()), vec![0.0; len]))
            })
            .collect();
        let generation = capacity.clone();
        let demand = DemandSeries::new(&params.demand, &model.regions, &time_index);

        let mut system = Self {
            model,
            time_index,
            capacity,
            generation,
            demand,
            rng: StdRng::seed_from_u64(seed),
        };

        for (technology, initial) in &model.initial_capacity {
            for (region_id, share) in &initial.shares {
                system.add_capacity(
                    *technology,
                    region_id,
                    initial.total * *share,
                    params.start_year,
                )?;
            }
        }

        for addition in &model.capacity_additions {
            system.add_capacity(
                addition.technology,
                &addition.region_id,
                addition.capacity,
                addition.year,
            )?;
        }

        Ok(system)
    }

    /// The simulation clock
    pub fn time_index(&self) -> &TimeIndex {
        &self.time_index
    }

    /// Add capacity for a technology in a region from `year` until the end of the simulation.
    ///
    /// Additions for years after the end of the simulation have no effect.
    pub fn add_capacity(
        &mut self,
        technology: Technology,
        region_id: &RegionID,
        capacity: Capacity,
        year: u32,
    ) -> Result<()> {
        ensure!(
            capacity.is_finite() && capacity >= Capacity(0.0),
            "Cannot add {capacity} MW of {technology}: capacity must be finite and non-negative"
        );
        ensure!(
            self.model.technologies.contains_key(&technology),
            "Unknown technology {technology}"
        );
        ensure!(
            self.model.regions.contains_key(region_id),
            "Unknown region {region_id}"
        );
        ensure!(
            year >= *self.time_index.years().start(),
            "Cannot add capacity in {year}, which is before the start of the simulation"
        );

        let range = self.time_index.buckets_from(year);
        if range.is_empty() {
            debug!("Ignoring addition of {technology} in {year}, after the end of the simulation");
            return Ok(());
        }

        let key = (technology, region_id.clone());
        let series = self
            .capacity
            .get_mut(&key)
            .with_context(|| format!("No capacity series for {technology} in {region_id}"))?;
        for value in &mut series[range] {
            *value += capacity.value();
        }

        Ok(())
    }

    /// Generate electricity from installed capacity for every bucket of a year.
    ///
    /// Each bucket's capacity factor is the technology's mean plus normally distributed noise,
    /// clamped to [0, 1].
    pub fn simulate_generation(&mut self, year: u32) -> Result<()> {
        let range = self.year_range(year)?;
        let hours = self.time_index.resolution().bucket_hours();
        let noise = self.model.parameters.capacity_factor_noise.value();

        for ((technology, region_id), capacity) in &self.capacity {
            let mean = self.model.technologies[technology].capacity_factor.value();
            let generation = self
                .generation
                .get_mut(&(*technology, region_id.clone()))
                .with_context(|| format!("No generation series for {technology} in {region_id}"))?;
            for bucket in range.clone() {
                let capacity_factor =
                    (mean + noise * standard_normal(&mut self.rng)).clamp(0.0, 1.0);
                generation[bucket] = capacity[bucket] * capacity_factor * hours;
            }
        }

        Ok(())
    }

    /// The proportion of a year's generation which came from renewable technologies.
    ///
    /// Zero if nothing was generated.
    pub fn calculate_renewable_share(&self, year: u32) -> Result<Dimensionless> {
        let generation = self.generation_by_technology(year)?;
        let total: Energy = generation.values().copied().sum();
        if total.value() <= 0.0 {
            return Ok(Dimensionless(0.0));
        }

        let renewable: Energy = generation
            .iter()
            .filter(|(technology, _)| technology.is_renewable())
            .map(|(_, energy)| *energy)
            .sum();

        Ok(renewable / total)
    }

    /// Summarise capacity, generation and demand for a year
    pub fn get_system_summary(&self, year: u32) -> Result<AnnualSummary> {
        let capacity_by_technology = self.capacity_by_technology(year)?;
        let generation_by_technology = self.generation_by_technology(year)?;

        Ok(AnnualSummary {
            year,
            total_capacity: capacity_by_technology.values().copied().sum(),
            total_generation: generation_by_technology.values().copied().sum(),
            total_demand: self.demand.total_for_year(&self.time_index, year),
            renewable_share: self.calculate_renewable_share(year)?,
            capacity_by_technology,
            generation_by_technology,
        })
    }

    /// Simulate generation for each year in turn, returning a summary for each.
    ///
    /// An empty range of years gives an empty result.
    pub fn simulate(&mut self, years: RangeInclusive<u32>) -> Result<Vec<AnnualSummary>> {
        years
            .map(|year| {
                debug!("Simulating generation for {year}");
                self.simulate_generation(year)?;
                self.get_system_summary(year)
            })
            .collect()
    }

    /// The capacity series for a technology in a region
    pub fn capacity_series(&self, technology: Technology, region_id: &RegionID) -> Option<&[f64]> {
        self.capacity
            .get(&(technology, region_id.clone()))
            .map(Vec::as_slice)
    }

    /// The generation series for a technology in a region
    pub fn generation_series(
        &self,
        technology: Technology,
        region_id: &RegionID,
    ) -> Option<&[f64]> {
        self.generation
            .get(&(technology, region_id.clone()))
            .map(Vec::as_slice)
    }

    /// The demand series for a region
    pub fn demand_series(&self, region_id: &RegionID) -> Option<&[f64]> {
        self.demand.get(region_id)
    }

    fn year_range(&self, year: u32) -> Result<std::ops::Range<usize>> {
        match self.time_index.year_range(year) {
            Some(range) => Ok(range),
            None => bail!("{year} is outside the simulated years"),
        }
    }

    /// Installed capacity per technology in the last bucket of a year
    fn capacity_by_technology(&self, year: u32) -> Result<IndexMap<Technology, Capacity>> {
        let last = self.year_range(year)?.end - 1;
        let mut totals: IndexMap<Technology, Capacity> = self
            .model
            .technologies
            .keys()
            .map(|technology| (*technology, Capacity(0.0)))
            .collect();
        for ((technology, _), series) in &self.capacity {
            totals[technology] += Capacity(series[last]);
        }

        Ok(totals)
    }

    /// Energy generated per technology over a year
    fn generation_by_technology(&self, year: u32) -> Result<IndexMap<Technology, Energy>> {
        let range = self.year_range(year)?;
        let mut totals: IndexMap<Technology, Energy> = self
            .model
            .technologies
            .keys()
            .map(|technology| (*technology, Energy(0.0)))
            .collect();
        for ((technology, _), series) in &self.generation {
            totals[technology] += Energy(series[range.clone()].iter().sum());
        }

        Ok(totals)
    }
}
