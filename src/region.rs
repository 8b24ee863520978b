//! Regions represent the administrative divisions over which capacity and demand are spread.
use crate::id::{define_id_getter, define_id_type};
use crate::units::Dimensionless;
use anyhow::{Result, ensure};
use float_cmp::approx_eq;
use indexmap::IndexMap;
use serde::Deserialize;

define_id_type! {RegionID}

/// A map of [`Region`]s, keyed by region ID
pub type RegionMap = IndexMap<RegionID, Region>;

/// The proportions of some national quantity allocated to each region
pub type RegionalShares = IndexMap<RegionID, Dimensionless>;

/// The base demand (MW) of each division, used to derive the default demand shares
const DEFAULT_REGIONS: [(&str, f64); 8] = [
    ("Dhaka", 5000.0),
    ("Chittagong", 2000.0),
    ("Khulna", 1000.0),
    ("Rajshahi", 800.0),
    ("Sylhet", 600.0),
    ("Barishal", 500.0),
    ("Rangpur", 700.0),
    ("Mymensingh", 400.0),
];

/// How the default solar capacity is split between divisions
const DEFAULT_SOLAR_SHARES: [f64; 8] = [0.15, 0.20, 0.15, 0.15, 0.10, 0.10, 0.10, 0.05];

/// Represents a region with an ID, a longer description and its share of national demand.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Region {
    /// A unique identifier for a region (e.g. "Dhaka").
    pub id: RegionID,
    /// A text description of the region.
    pub description: String,
    /// The proportion of national electricity demand occurring in this region
    pub demand_share: Dimensionless,
}
define_id_getter! {Region, RegionID}

/// Check that a set of regional shares is non-negative and sums to one.
///
/// # Arguments
///
/// * `shares` - The shares to check
/// * `what` - A description of what is being shared, for error messages
pub fn check_shares_sum_to_one<'a, I>(shares: I, what: &str) -> Result<()>
where
    I: IntoIterator<Item = &'a Dimensionless>,
{
    let mut sum = 0.0;
    for share in shares {
        ensure!(
            share.is_finite() && share.value() >= 0.0,
            "Regional shares for {what} must be non-negative (got {share})"
        );
        sum += share.value();
    }

    ensure!(
        approx_eq!(f64, sum, 1.0, epsilon = 1e-5),
        "Regional shares for {what} must sum to one (got {sum})"
    );

    Ok(())
}

/// The eight divisions of Bangladesh, with demand shares in proportion to their base demand
pub fn default_regions() -> RegionMap {
    let total: f64 = DEFAULT_REGIONS.iter().map(|(_, demand)| demand).sum();
    DEFAULT_REGIONS
        .iter()
        .map(|(name, demand)| {
            let id = RegionID::new(name);
            let region = Region {
                id: id.clone(),
                description: format!("{name} Division"),
                demand_share: Dimensionless(demand / total),
            };
            (id, region)
        })
        .collect()
}

/// The built-in regional split for existing solar capacity
pub fn default_solar_shares() -> RegionalShares {
    DEFAULT_REGIONS
        .iter()
        .zip(DEFAULT_SOLAR_SHARES)
        .map(|((name, _), share)| (RegionID::new(name), Dimensionless(share)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;

    #[test]
    fn test_default_regions() {
        let regions = default_regions();
        assert_eq!(regions.len(), 8);
        assert_eq!(regions.get_index(0).unwrap().0, &RegionID::new("Dhaka"));
        check_shares_sum_to_one(regions.values().map(|r| &r.demand_share), "demand").unwrap();
    }

    #[test]
    fn test_default_solar_shares() {
        let shares = default_solar_shares();
        assert_eq!(shares[&RegionID::new("Chittagong")], Dimensionless(0.20));
        check_shares_sum_to_one(shares.values(), "solar_pv").unwrap();
    }

    #[test]
    fn test_check_shares_sum_to_one_bad() {
        let shares = [Dimensionless(0.5), Dimensionless(0.4)];
        assert_error!(
            check_shares_sum_to_one(&shares, "wind"),
            "Regional shares for wind must sum to one (got 0.9)"
        );

        let shares = [Dimensionless(1.5), Dimensionless(-0.5)];
        assert_error!(
            check_shares_sum_to_one(&shares, "coal"),
            "Regional shares for coal must be non-negative (got -0.5)"
        );
    }
}
