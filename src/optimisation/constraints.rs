//! Code for adding constraints to the planning problem.
//!
//! Rows are emitted in the order fixed by the ledger's constraint plan:
//! stock-balance rows, then contract-fulfilment rows, then storage-limit
//! rows. Opening stock is zero; every lot in the plan is created by a
//! decision inside the model.
use super::VariableMap;
use crate::ledger::LotLedger;
use crate::model::Model;
use highs::RowProblem as Problem;

/// Add all constraint rows for the plan.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `model` - The planning model
/// * `ledger` - The constraint plan derived from the FIFO ordering rules
pub fn add_plan_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    ledger: &LotLedger,
) {
    add_balance_constraints(problem, variables, model, ledger);
    add_fulfilment_constraints(problem, variables, model, ledger);
    add_storage_limit_constraints(problem, variables, model);
}

/// Add one stock-balance row per (material, period).
///
/// carry-in + production + committed receipts = conversion use + shipments + carry-out
///
/// The receipts are constants, so they appear on the right-hand side (negated,
/// as every variable term is kept on the left). Demand due at a period can
/// only draw on the balance available at that period, which both rules out
/// shipping from the future and makes the accounting FIFO-equivalent.
fn add_balance_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    ledger: &LotLedger,
) {
    let mut terms = Vec::new();
    for (material_id, period) in ledger.balance_keys() {
        if let Some(prev) = period.pred() {
            terms.push((variables.carry(material_id, prev), 1.0));
        }
        terms.push((variables.production(material_id, *period), 1.0));
        for conversion in model.conversions_consuming(material_id) {
            terms.push((
                variables.production(&conversion.output_id, *period),
                -conversion.factor,
            ));
        }
        for contract in model.demand_contracts_for(material_id, *period) {
            terms.push((variables.shipment(&contract.id), -1.0));
        }
        terms.push((variables.carry(material_id, *period), -1.0));

        let rhs = -model.supply_quantity(material_id, *period).value();
        problem.add_row(rhs..=rhs, terms.drain(0..));
    }
}

/// Add one fulfilment row per demand contract.
///
/// Firm contracts must ship exactly their committed quantity. Soft contracts
/// may split the quantity between shipment and (penalised) shortfall.
fn add_fulfilment_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    model: &Model,
    ledger: &LotLedger,
) {
    for (contract_id, contract) in ledger.fulfilment_keys().iter().zip(&model.demand_contracts) {
        debug_assert_eq!(contract_id, &contract.id);

        let quantity = contract.quantity.value();
        let shipment = (variables.shipment(&contract.id), 1.0);
        if contract.is_firm() {
            problem.add_row(quantity..=quantity, [shipment]);
        } else {
            let shortfall = (variables.shortfall(&contract.id), 1.0);
            problem.add_row(quantity..=quantity, [shipment, shortfall]);
        }
    }
}

/// Add storage-limit rows for materials with a bounded storage period.
///
/// Stock carried out of period t must be used within the next s periods, so
/// it cannot exceed the total outflow opportunity in (t, t+s]:
///
/// carry\[m\]\[t\] <= sum of shipments and conversion use over the window
fn add_storage_limit_constraints(problem: &mut Problem, variables: &VariableMap, model: &Model) {
    for (material_id, material) in &model.materials {
        let Some(limit) = material.max_storage_periods else {
            continue;
        };

        for period in model.horizon.iter() {
            let mut terms = vec![(variables.carry(material_id, period), 1.0)];
            for later in model.horizon.iter_window(period, limit) {
                for contract in model.demand_contracts_for(material_id, later) {
                    terms.push((variables.shipment(&contract.id), -1.0));
                }
                for conversion in model.conversions_consuming(material_id) {
                    terms.push((
                        variables.production(&conversion.output_id, later),
                        -conversion.factor,
                    ));
                }
            }

            problem.add_row(..=0.0, terms);
        }
    }
}
