//! Code for reading installed and planned capacity from CSV files.
use super::*;
use crate::id::IDCollection;
use crate::model::{
    CapacityAddition, InitialCapacity, InitialCapacityMap, check_capacity_addition,
    check_capacity_shares,
};
use crate::region::{RegionMap, RegionalShares, default_solar_shares};
use crate::technology::{Technology, TechnologyMap};
use crate::units::{Capacity, Dimensionless};

const INITIAL_CAPACITY_SHARES_FILE_NAME: &str = "initial_capacity_shares.csv";
const CAPACITY_ADDITIONS_FILE_NAME: &str = "capacity_additions.csv";

/// A row of the initial capacity shares CSV file
#[derive(Debug, Deserialize, PartialEq)]
struct InitialCapacityShareRaw {
    technology_id: Technology,
    region_id: String,
    share: Dimensionless,
}

/// A row of the capacity additions CSV file
#[derive(Debug, Deserialize, PartialEq)]
struct CapacityAdditionRaw {
    technology_id: Technology,
    region_id: String,
    year: u32,
    capacity: Capacity,
}

/// Read the regional split of initial capacity and combine it with national totals.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `totals` - National initial capacity for each technology with some installed
/// * `regions` - Regions for the model
pub fn read_initial_capacity(
    model_dir: &Path,
    totals: &IndexMap<Technology, Capacity>,
    regions: &RegionMap,
) -> Result<InitialCapacityMap> {
    let file_path = model_dir.join(INITIAL_CAPACITY_SHARES_FILE_NAME);
    let shares = match read_csv_optional(&file_path, "built-in solar capacity shares")? {
        Some(raw) => read_shares_from_iter(raw.into_iter(), regions)
            .with_context(|| input_err_msg(&file_path))?,
        None => IndexMap::from([(Technology::SolarPv, default_solar_shares())]),
    };

    combine_totals_and_shares(totals, shares, regions).with_context(|| input_err_msg(&file_path))
}

fn read_shares_from_iter<I>(
    iter: I,
    regions: &RegionMap,
) -> Result<IndexMap<Technology, RegionalShares>>
where
    I: Iterator<Item = InitialCapacityShareRaw>,
{
    let mut shares: IndexMap<Technology, RegionalShares> = IndexMap::new();
    for raw in iter {
        let region_id = regions.get_id_by_str(&raw.region_id)?;
        let entry = shares.entry(raw.technology_id).or_default();
        ensure!(
            entry.insert(region_id.clone(), raw.share).is_none(),
            "Duplicate share for {} in region {region_id}",
            raw.technology_id
        );
    }

    Ok(shares)
}

fn combine_totals_and_shares(
    totals: &IndexMap<Technology, Capacity>,
    mut shares: IndexMap<Technology, RegionalShares>,
    regions: &RegionMap,
) -> Result<InitialCapacityMap> {
    let mut initial_capacity = InitialCapacityMap::new();
    for (technology, total) in totals {
        let technology_shares = shares.shift_remove(technology).with_context(|| {
            format!("{technology} has initial capacity but no regional shares were given")
        })?;
        initial_capacity.insert(
            *technology,
            InitialCapacity {
                total: *total,
                shares: technology_shares,
            },
        );
    }

    // Shares for technologies without any capacity are unused but must still be valid
    for (technology, technology_shares) in &shares {
        check_capacity_shares(*technology, technology_shares, regions)?;
    }
    for (technology, initial) in &initial_capacity {
        check_capacity_shares(*technology, &initial.shares, regions)?;
    }

    Ok(initial_capacity)
}

/// Read the planned capacity additions from the model folder.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `technologies` - The technology table
/// * `regions` - Regions for the model
pub fn read_capacity_additions(
    model_dir: &Path,
    technologies: &TechnologyMap,
    regions: &RegionMap,
) -> Result<Vec<CapacityAddition>> {
    let file_path = model_dir.join(CAPACITY_ADDITIONS_FILE_NAME);
    let Some(raw) = read_csv_optional(&file_path, "no planned capacity additions")? else {
        return Ok(Vec::new());
    };

    read_additions_from_iter(raw.into_iter(), technologies, regions)
        .with_context(|| input_err_msg(&file_path))
}

fn read_additions_from_iter<I>(
    iter: I,
    technologies: &TechnologyMap,
    regions: &RegionMap,
) -> Result<Vec<CapacityAddition>>
where
    I: Iterator<Item = CapacityAdditionRaw>,
{
    iter.map(|raw| {
        let addition = CapacityAddition {
            technology: raw.technology_id,
            region_id: regions.get_id_by_str(&raw.region_id)?,
            year: raw.year,
            capacity: raw.capacity,
        };
        check_capacity_addition(&addition, technologies, regions)?;
        Ok(addition)
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::region::default_regions;
    use crate::technology::default_technologies;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn share(technology_id: Technology, region_id: &str, share: f64) -> InitialCapacityShareRaw {
        InitialCapacityShareRaw {
            technology_id,
            region_id: region_id.to_string(),
            share: Dimensionless(share),
        }
    }

    #[test]
    fn test_read_initial_capacity_default() {
        let dir = tempdir().unwrap();
        let totals = IndexMap::from([(Technology::SolarPv, Capacity(946.0))]);
        let initial = read_initial_capacity(dir.path(), &totals, &default_regions()).unwrap();
        assert_eq!(initial[&Technology::SolarPv].total, Capacity(946.0));
        assert_eq!(initial[&Technology::SolarPv].shares.len(), 8);
    }

    #[test]
    fn test_read_initial_capacity_from_file() {
        let dir = tempdir().unwrap();
        {
            let mut file =
                File::create(dir.path().join(INITIAL_CAPACITY_SHARES_FILE_NAME)).unwrap();
            writeln!(
                file,
                "technology_id,region_id,share
coal,Chittagong,0.6
coal,Khulna,0.4"
            )
            .unwrap();
        }

        let totals = IndexMap::from([(Technology::Coal, Capacity(2000.0))]);
        let initial = read_initial_capacity(dir.path(), &totals, &default_regions()).unwrap();
        assert_eq!(
            initial[&Technology::Coal].shares,
            RegionalShares::from([
                ("Chittagong".into(), Dimensionless(0.6)),
                ("Khulna".into(), Dimensionless(0.4)),
            ])
        );
    }

    #[test]
    fn test_shares_missing_for_technology() {
        let regions = default_regions();
        let rows = [share(Technology::Coal, "Dhaka", 1.0)];
        let shares = read_shares_from_iter(rows.into_iter(), &regions).unwrap();
        let totals = IndexMap::from([(Technology::Wind, Capacity(10.0))]);
        assert_error!(
            combine_totals_and_shares(&totals, shares, &regions),
            "wind has initial capacity but no regional shares were given"
        );
    }

    #[test]
    fn test_shares_unknown_region() {
        let rows = [share(Technology::Coal, "Atlantis", 1.0)];
        assert_error!(
            read_shares_from_iter(rows.into_iter(), &default_regions()),
            "Unknown ID Atlantis found"
        );
    }

    #[test]
    fn test_shares_bad_sum() {
        let regions = default_regions();
        let rows = [
            share(Technology::Coal, "Dhaka", 0.5),
            share(Technology::Coal, "Khulna", 0.3),
        ];
        let shares = read_shares_from_iter(rows.into_iter(), &regions).unwrap();
        let totals = IndexMap::from([(Technology::Coal, Capacity(10.0))]);
        assert_error!(
            combine_totals_and_shares(&totals, shares, &regions),
            "Invalid initial capacity for coal"
        );
    }

    #[test]
    fn test_read_capacity_additions() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(CAPACITY_ADDITIONS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "technology_id,region_id,year,capacity
wind,Chittagong,2030,500"
            )
            .unwrap();
        }

        let additions =
            read_capacity_additions(dir.path(), &default_technologies(), &default_regions())
                .unwrap();
        assert_eq!(
            additions,
            [CapacityAddition {
                technology: Technology::Wind,
                region_id: "Chittagong".into(),
                year: 2030,
                capacity: Capacity(500.0),
            }]
        );
    }

    #[test]
    fn test_read_capacity_additions_negative() {
        let rows = [CapacityAdditionRaw {
            technology_id: Technology::Wind,
            region_id: "Dhaka".to_string(),
            year: 2030,
            capacity: Capacity(-1.0),
        }];
        assert_error!(
            read_additions_from_iter(rows.into_iter(), &default_technologies(), &default_regions()),
            "Capacity additions must be finite, non-negative numbers"
        );
    }
}
