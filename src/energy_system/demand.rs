//! Electricity demand for each region and time bucket.
use super::time_index::{HOURS_PER_YEAR, TimeIndex};
use crate::model::{DemandParameters, TimeResolution};
use crate::region::{RegionID, RegionMap};
use crate::units::Energy;
use indexmap::IndexMap;
use std::f64::consts::PI;

/// National demand (MW) for each hour of a year
pub fn national_hourly_demand(params: &DemandParameters, years_elapsed: u32) -> Vec<f64> {
    let growth = (1.0 + params.annual_growth.value()).powi(years_elapsed as i32);
    let base = params.base_load * growth;
    let cap = params.peak_load * growth;
    let daily = params.daily_variation.value();
    let seasonal = params.seasonal_variation.value();

    (0..HOURS_PER_YEAR)
        .map(|hour| {
            let hour_of_day = (hour % 24) as f64;
            let day_of_year = (hour / 24 + 1) as f64;
            let daily_factor = 1.0 + daily * (PI * hour_of_day / 12.0).sin();
            let seasonal_factor = 1.0 + seasonal * (2.0 * PI * (day_of_year - 182.0) / 365.0).sin();
            (base * daily_factor * seasonal_factor).min(cap)
        })
        .collect()
}

/// Demand (MW) for every region and time bucket
#[derive(Debug, Clone)]
pub struct DemandSeries(IndexMap<RegionID, Vec<f64>>);

impl DemandSeries {
    /// Build the demand series for all regions over the whole time index.
    ///
    /// At annual resolution each bucket holds the mean of that year's hourly profile.
    pub fn new(params: &DemandParameters, regions: &RegionMap, time_index: &TimeIndex) -> Self {
        let start_year = *time_index.years().start();
        let national: Vec<f64> = time_index
            .years()
            .flat_map(|year| {
                let hourly = national_hourly_demand(params, year - start_year);
                match time_index.resolution() {
                    TimeResolution::Hourly => hourly,
                    TimeResolution::Annual => {
                        vec![hourly.iter().sum::<f64>() / HOURS_PER_YEAR as f64]
                    }
                }
            })
            .collect();

        let series = regions
            .iter()
            .map(|(id, region)| {
                let share = region.demand_share.value();
                (id.clone(), national.iter().map(|mw| mw * share).collect())
            })
            .collect();

        Self(series)
    }

    /// The demand series for a region
    pub fn get(&self, region_id: &RegionID) -> Option<&[f64]> {
        self.0.get(region_id).map(Vec::as_slice)
    }

    /// Total energy demanded across all regions in a year.
    ///
    /// Returns zero for years outside the time index.
    pub fn total_for_year(&self, time_index: &TimeIndex, year: u32) -> Energy {
        let Some(range) = time_index.year_range(year) else {
            return Energy(0.0);
        };

        let hours = time_index.resolution().bucket_hours();
        self.0
            .values()
            .map(|series| Energy(series[range.clone()].iter().sum::<f64>() * hours))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::default_regions;
    use crate::units::Dimensionless;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_national_hourly_demand() {
        let params = DemandParameters::default();
        let demand = national_hourly_demand(&params, 0);
        assert_eq!(demand.len(), HOURS_PER_YEAR);
        assert!(demand.iter().all(|mw| *mw <= params.peak_load));

        // Hour 0 of day 182: both cycles are at zero
        assert_approx_eq!(f64, demand[181 * 24], params.base_load, epsilon = 1e-6);
    }

    #[test]
    fn test_national_hourly_demand_growth() {
        let params = DemandParameters {
            daily_variation: Dimensionless(0.0),
            seasonal_variation: Dimensionless(0.0),
            ..DemandParameters::default()
        };
        let demand = national_hourly_demand(&params, 2);
        assert_approx_eq!(f64, demand[0], 12000.0 * 1.06 * 1.06, epsilon = 1e-6);
    }

    #[test]
    fn test_national_hourly_demand_capped_at_peak() {
        let params = DemandParameters {
            peak_load: 12000.0,
            ..DemandParameters::default()
        };
        let demand = national_hourly_demand(&params, 0);
        assert!(demand.iter().all(|mw| *mw <= 12000.0 + 1e-9));
    }

    #[test]
    fn test_demand_series_annual() {
        let params = DemandParameters {
            daily_variation: Dimensionless(0.0),
            seasonal_variation: Dimensionless(0.0),
            ..DemandParameters::default()
        };
        let regions = default_regions();
        let time_index = TimeIndex::new(2024, 2025, TimeResolution::Annual);
        let demand = DemandSeries::new(&params, &regions, &time_index);

        let dhaka = demand.get(&"Dhaka".into()).unwrap();
        assert_eq!(dhaka.len(), 2);
        assert_approx_eq!(f64, dhaka[0], 12000.0 * 5000.0 / 11000.0, epsilon = 1e-6);

        assert_approx_eq!(
            Energy,
            demand.total_for_year(&time_index, 2024),
            Energy(12000.0 * 8760.0),
            epsilon = 1e-3
        );
        assert_eq!(demand.total_for_year(&time_index, 2030), Energy(0.0));
    }
}
