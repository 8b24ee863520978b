//! Fixtures for tests

use crate::model::{CapacityAddition, InitialCapacity, Model};
use crate::region::default_solar_shares;
use crate::technology::Technology;
use crate::units::Capacity;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// The built-in model, simulated from 2024 to 2050
#[fixture]
pub fn model() -> Model {
    Model::default()
}

/// A model with renewables and fossil plants, simulated from 2024 to 2030
#[fixture]
pub fn short_model() -> Model {
    let mut model = Model::default();
    model.parameters.end_year = 2030;
    for (technology, total) in [(Technology::NaturalGas, 1000.0), (Technology::Coal, 500.0)] {
        model.initial_capacity.insert(
            technology,
            InitialCapacity {
                total: Capacity(total),
                shares: default_solar_shares(),
            },
        );
    }
    model.capacity_additions.push(CapacityAddition {
        technology: Technology::Wind,
        region_id: "Dhaka".into(),
        year: 2027,
        capacity: Capacity(200.0),
    });

    model
}
