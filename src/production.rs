//! Code for working with production capacities and conversions.
//!
//! Production of a material in a period is bounded by an explicit capacity;
//! anything unspecified has capacity zero. A conversion states how many tonnes
//! of an input material one tonne of an output material consumes when produced.
use crate::horizon::Period;
use crate::input::read_vec_from_csv_optional;
use crate::material::MaterialID;
use crate::units::Tonnes;
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const CAPACITIES_FILE_NAME: &str = "capacities.csv";
const CONVERSIONS_FILE_NAME: &str = "conversions.csv";

/// A production capacity record for one material in one period
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct CapacityRecord {
    /// The material the capacity applies to
    pub material_id: MaterialID,
    /// The period the capacity applies to
    pub period: Period,
    /// The maximum quantity that can be produced in the period
    pub capacity: Tonnes,
}

/// Used for looking up capacities in a [`CapacityMap`]
type CapacityKey = (MaterialID, Period);

/// A data structure for easy lookup of production capacities.
///
/// Unspecified combinations deliberately default to zero capacity; there is no
/// implicit unlimited production.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct CapacityMap(HashMap<CapacityKey, Tonnes>);

impl CapacityMap {
    /// Create a new, empty [`CapacityMap`]
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Insert a capacity for the given material and period
    pub fn insert(&mut self, material_id: MaterialID, period: Period, capacity: Tonnes) {
        self.0.insert((material_id, period), capacity);
    }

    /// Retrieve the capacity for the given material and period, defaulting to zero
    pub fn get(&self, material_id: &MaterialID, period: Period) -> Tonnes {
        self.0
            .get(&(material_id.clone(), period))
            .copied()
            .unwrap_or(Tonnes::ZERO)
    }
}

/// Producing one tonne of `output_id` consumes `factor` tonnes of `input_id`
/// in the same period.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Conversion {
    /// The material being produced
    pub output_id: MaterialID,
    /// The material being consumed
    pub input_id: MaterialID,
    /// Tonnes of input consumed per tonne of output produced
    pub factor: f64,
}

/// Read capacity records from the capacities CSV file.
///
/// A missing file means every capacity is zero.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_capacities(model_dir: &Path) -> Result<Vec<CapacityRecord>> {
    read_vec_from_csv_optional(&model_dir.join(CAPACITIES_FILE_NAME))
}

/// Read conversion records from the conversions CSV file.
///
/// A missing file means production consumes no other materials.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_conversions(model_dir: &Path) -> Result<Vec<Conversion>> {
    read_vec_from_csv_optional(&model_dir.join(CONVERSIONS_FILE_NAME))
}
