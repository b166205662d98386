//! Code for projecting the solver's primal values into operational schedules.
use crate::contract::ContractID;
use crate::horizon::Period;
use crate::material::MaterialID;
use crate::model::Model;
use crate::optimisation::{Solution, VariableKey};
use crate::units::{Money, Tonnes};
use serde::{Deserialize, Serialize};

/// How much of a material to produce in a period
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProductionRow {
    /// The material being produced
    pub material_id: MaterialID,
    /// The period of production
    pub period: Period,
    /// The quantity to produce
    pub quantity: Tonnes,
}

/// How much to ship against a demand contract.
///
/// Equal to the contract's committed quantity unless the contract is soft.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShipmentRow {
    /// The contract being served
    pub contract_id: ContractID,
    /// The material being shipped
    pub material_id: MaterialID,
    /// The period the delivery is due
    pub period: Period,
    /// The quantity to ship
    pub quantity: Tonnes,
}

/// How much of a material is in stock at the end of a period
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarryRow {
    /// The material in stock
    pub material_id: MaterialID,
    /// The period the stock is carried out of
    pub period: Period,
    /// The end-of-period stock level
    pub quantity: Tonnes,
}

/// The operational schedules extracted from an optimal solution
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSchedule {
    /// Production quantities for every material and period
    pub production: Vec<ProductionRow>,
    /// Shipment quantities for every demand contract
    pub shipments: Vec<ShipmentRow>,
    /// End-of-period stock levels for every material and period
    pub inventory: Vec<CarryRow>,
    /// The objective value, including the committed procurement cost
    pub objective_value: Money,
}

/// Project the primal solution into the three schedules.
///
/// This is a pure function of its inputs: the same model and solution always
/// yield the same rows in the same order. Rows cover the full
/// (material, period) grid, zeroes included.
///
/// # Arguments
///
/// * `model` - The planning model
/// * `solution` - The solution returned by the solver
pub fn extract_schedule(model: &Model, solution: &Solution) -> PlanSchedule {
    let mut production = Vec::new();
    let mut inventory = Vec::new();
    let mut shipped = Vec::new();
    for (key, value) in solution.iter_values() {
        match key {
            VariableKey::Production(material_id, period) => production.push(ProductionRow {
                material_id: material_id.clone(),
                period: *period,
                quantity: Tonnes(value),
            }),
            VariableKey::Carry(material_id, period) => inventory.push(CarryRow {
                material_id: material_id.clone(),
                period: *period,
                quantity: Tonnes(value),
            }),
            // Shipment variables were added in contract order
            VariableKey::Shipment(_) => shipped.push(value),
            VariableKey::Shortfall(_) => {}
        }
    }

    let shipments = model
        .demand_contracts
        .iter()
        .zip(shipped)
        .map(|(contract, quantity)| ShipmentRow {
            contract_id: contract.id.clone(),
            material_id: contract.material_id.clone(),
            period: contract.period,
            quantity: Tonnes(quantity),
        })
        .collect();

    PlanSchedule {
        production,
        shipments,
        inventory,
        objective_value: solution.objective_value(),
    }
}
