//! Code for planning models.
//!
//! A [`Model`] is the immutable snapshot of all planning inputs consumed by
//! the ledger and the model builder.
use crate::contract::{DemandContract, SupplyContract, read_demand_contracts, read_supply_contracts};
use crate::horizon::{Horizon, Period};
use crate::input::read_toml;
use crate::material::{MaterialID, MaterialMap, read_materials};
use crate::production::{CapacityMap, Conversion, read_capacities, read_conversions};
use crate::registry::Registry;
use crate::units::{Money, Tonnes};
use anyhow::Result;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::path::Path;

const MODEL_FILE_NAME: &str = "model.toml";

/// Which way the objective points
#[derive(PartialEq, Copy, Clone, Debug, DeserializeLabeledStringEnum)]
pub enum ObjectiveSense {
    /// Minimise total procurement, production and storage cost
    #[string = "min_cost"]
    MinimiseCost,
    /// Maximise shipment revenue minus total cost
    #[string = "max_margin"]
    MaximiseMargin,
}

impl Default for ObjectiveSense {
    fn default() -> Self {
        Self::MinimiseCost
    }
}

/// Model definition
#[derive(Debug)]
pub struct Model {
    /// The planning horizon
    pub horizon: Horizon,
    /// All materials, in registration order
    pub materials: MaterialMap,
    /// Committed raw-material deliveries
    pub supply_contracts: Vec<SupplyContract>,
    /// Committed customer deliveries
    pub demand_contracts: Vec<DemandContract>,
    /// Per-material, per-period production capacities
    pub capacities: CapacityMap,
    /// Input requirements of production
    pub conversions: Vec<Conversion>,
    /// Which way the objective points
    pub objective: ObjectiveSense,
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
struct ModelFile {
    horizon: HorizonSection,
    #[serde(default)]
    objective: ObjectiveSection,
}

/// Represents the "horizon" section of the model file.
#[derive(Debug, Deserialize, PartialEq)]
struct HorizonSection {
    periods: u32,
}

/// Represents the "objective" section of the model file.
#[derive(Debug, Default, Deserialize, PartialEq)]
struct ObjectiveSection {
    #[serde(default)]
    sense: ObjectiveSense,
}

impl Model {
    pub(crate) fn new(
        horizon: Horizon,
        materials: MaterialMap,
        supply_contracts: Vec<SupplyContract>,
        demand_contracts: Vec<DemandContract>,
        capacities: CapacityMap,
        conversions: Vec<Conversion>,
        objective: ObjectiveSense,
    ) -> Self {
        Self {
            horizon,
            materials,
            supply_contracts,
            demand_contracts,
            capacities,
            conversions,
            objective,
        }
    }

    /// Read a model from the specified directory.
    ///
    /// All records pass through the [`Registry`] validation path, so a
    /// returned model is well-formed.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let model_dir = model_dir.as_ref();
        let model_file: ModelFile = read_toml(&model_dir.join(MODEL_FILE_NAME))?;

        let mut registry = Registry::new();
        registry.register_period_count(model_file.horizon.periods)?;

        for material in read_materials(model_dir)? {
            registry.add_material(material)?;
        }
        for contract in read_supply_contracts(model_dir)? {
            registry.add_supply_contract(contract)?;
        }
        for contract in read_demand_contracts(model_dir)? {
            registry.add_demand_contract(contract)?;
        }
        for record in read_capacities(model_dir)? {
            registry.set_capacity(record.material_id, record.period, record.capacity)?;
        }
        for conversion in read_conversions(model_dir)? {
            registry.add_conversion(conversion)?;
        }

        Ok(registry.finish(model_file.objective.sense)?)
    }

    /// The production capacity for the given material and period (zero if unspecified)
    pub fn capacity(&self, material_id: &MaterialID, period: Period) -> Tonnes {
        self.capacities.get(material_id, period)
    }

    /// The total committed delivery quantity for the given material and period
    pub fn supply_quantity(&self, material_id: &MaterialID, period: Period) -> Tonnes {
        self.supply_contracts
            .iter()
            .filter(|c| &c.material_id == material_id && c.period == period)
            .map(|c| c.quantity)
            .sum()
    }

    /// The total cost of all committed supply contracts.
    ///
    /// This is a constant of the plan: supply contracts are already signed.
    pub fn total_procurement_cost(&self) -> Money {
        self.supply_contracts.iter().map(SupplyContract::total_cost).sum()
    }

    /// Iterate over the demand contracts for a material due in a period
    pub fn demand_contracts_for<'a>(
        &'a self,
        material_id: &'a MaterialID,
        period: Period,
    ) -> impl Iterator<Item = &'a DemandContract> {
        self.demand_contracts
            .iter()
            .filter(move |c| &c.material_id == material_id && c.period == period)
    }

    /// Iterate over the conversions which consume the given material
    pub fn conversions_consuming<'a>(
        &'a self,
        material_id: &'a MaterialID,
    ) -> impl Iterator<Item = &'a Conversion> {
        self.conversions
            .iter()
            .filter(move |c| &c.input_id == material_id)
    }
}
