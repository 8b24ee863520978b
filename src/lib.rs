//! Techno-economic simulation of Bangladesh's electricity system transition.
//!
//! A model describes technologies, regions, demand and economic assumptions. The energy system is
//! simulated year by year, each year's fleet is appraised for cost and environmental impact, and
//! the results are compared across scenarios or sensitivity runs.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod energy_system;
pub mod environment;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod region;
pub mod scenario;
pub mod sensitivity;
pub mod settings;
pub mod technology;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the folder where program settings are stored
pub fn get_bdenergy_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("bdenergy");

    path
}
