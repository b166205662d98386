//! Code for working with supply and demand contracts.
//!
//! Both contract kinds are firm planning inputs: a fixed quantity at a fixed
//! period. There is no date range and no renegotiation at this stage.
use crate::horizon::Period;
use crate::id::define_id_type;
use crate::input::read_vec_from_csv_optional;
use crate::material::MaterialID;
use crate::units::{Money, MoneyPerTonne, Tonnes};
use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

const SUPPLY_CONTRACTS_FILE_NAME: &str = "supply_contracts.csv";
const DEMAND_CONTRACTS_FILE_NAME: &str = "demand_contracts.csv";

define_id_type! {ContractID}

/// A committed raw-material delivery arriving at a fixed period.
///
/// Supply contracts are already signed, so their quantities enter the model as
/// constants rather than decision variables.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct SupplyContract {
    /// Unique identifier for the contract
    pub id: ContractID,
    /// The material being delivered
    pub material_id: MaterialID,
    /// The period in which the delivery arrives
    pub period: Period,
    /// The delivered quantity
    pub quantity: Tonnes,
    /// The agreed price per tonne
    pub unit_cost: MoneyPerTonne,
}

impl SupplyContract {
    /// The total committed procurement cost of this contract
    pub fn total_cost(&self) -> Money {
        self.unit_cost * self.quantity
    }
}

/// A committed customer delivery due at a fixed period.
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct DemandContract {
    /// Unique identifier for the contract
    pub id: ContractID,
    /// The material to be delivered
    pub material_id: MaterialID,
    /// The period in which the delivery is due
    pub period: Period,
    /// The committed quantity
    pub quantity: Tonnes,
    /// The agreed price per tonne
    pub unit_price: MoneyPerTonne,
    /// Penalty per tonne of shortfall. If absent, the contract is firm and
    /// must be fulfilled exactly.
    pub shortfall_penalty: Option<MoneyPerTonne>,
}

impl DemandContract {
    /// Whether the contract must be fulfilled exactly
    pub fn is_firm(&self) -> bool {
        self.shortfall_penalty.is_none()
    }
}

/// Read supply contract records from the supply contracts CSV file.
///
/// A missing file means the plan has no committed deliveries.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_supply_contracts(model_dir: &Path) -> Result<Vec<SupplyContract>> {
    read_vec_from_csv_optional(&model_dir.join(SUPPLY_CONTRACTS_FILE_NAME))
}

/// Read demand contract records from the demand contracts CSV file.
///
/// A missing file means the plan has no customer deliveries.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_demand_contracts(model_dir: &Path) -> Result<Vec<DemandContract>> {
    read_vec_from_csv_optional(&model_dir.join(DEMAND_CONTRACTS_FILE_NAME))
}
