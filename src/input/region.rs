//! Code for reading region-related information from CSV files.
use super::*;
use crate::region::{Region, RegionMap, check_shares_sum_to_one, default_regions};

const REGIONS_FILE_NAME: &str = "regions.csv";

/// Reads regions from a CSV file, falling back on the divisions of Bangladesh.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// A [`RegionMap`] with the parsed regions data or an error
pub fn read_regions(model_dir: &Path) -> Result<RegionMap> {
    let file_path = model_dir.join(REGIONS_FILE_NAME);
    let Some(regions) = read_csv_optional(&file_path, "the eight divisions of Bangladesh")? else {
        return Ok(default_regions());
    };

    read_regions_from_iter(regions.into_iter()).with_context(|| input_err_msg(&file_path))
}

fn read_regions_from_iter<I>(iter: I) -> Result<RegionMap>
where
    I: Iterator<Item = Region>,
{
    let mut regions = RegionMap::new();
    for region in iter {
        let id = region.id.clone();
        ensure!(
            regions.insert(id.clone(), region).is_none(),
            "Duplicate region ID {id}"
        );
    }

    check_shares_sum_to_one(regions.values().map(|region| &region.demand_share), "demand")?;

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use crate::units::Dimensionless;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    /// Create an example regions file in dir_path
    fn create_regions_file(dir_path: &Path) {
        let file_path = dir_path.join(REGIONS_FILE_NAME);
        let mut file = File::create(file_path).unwrap();
        writeln!(
            file,
            "id,description,demand_share
Dhaka,Dhaka Division,0.75
Sylhet,Sylhet Division,0.25"
        )
        .unwrap();
    }

    fn region(id: &str, demand_share: f64) -> Region {
        Region {
            id: id.into(),
            description: id.to_string(),
            demand_share: Dimensionless(demand_share),
        }
    }

    #[test]
    fn test_read_regions() {
        let dir = tempdir().unwrap();
        create_regions_file(dir.path());
        let regions = read_regions(dir.path()).unwrap();
        assert_eq!(
            regions,
            RegionMap::from([
                (
                    "Dhaka".into(),
                    Region {
                        id: "Dhaka".into(),
                        description: "Dhaka Division".to_string(),
                        demand_share: Dimensionless(0.75),
                    }
                ),
                (
                    "Sylhet".into(),
                    Region {
                        id: "Sylhet".into(),
                        description: "Sylhet Division".to_string(),
                        demand_share: Dimensionless(0.25),
                    }
                ),
            ])
        );
    }

    #[test]
    fn test_read_regions_duplicate() {
        let regions = [region("Dhaka", 0.5), region("Dhaka", 0.5)];
        assert_error!(
            read_regions_from_iter(regions.into_iter()),
            "Duplicate region ID Dhaka"
        );
    }

    #[test]
    fn test_read_regions_bad_shares() {
        let regions = [region("Dhaka", 0.5), region("Khulna", 0.25)];
        assert_error!(
            read_regions_from_iter(regions.into_iter()),
            "Regional shares for demand must sum to one (got 0.75)"
        );
    }
}
