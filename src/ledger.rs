//! The FIFO lot ledger.
//!
//! "Allocate oldest inventory first" cannot be expressed as a runtime queue
//! inside a linear program, so the ledger encodes it as cumulative stock
//! accounting instead: one stock-balance row per (material, period) and one
//! fulfilment row per demand contract, with each contract drawing only on the
//! balance available at its due period. Shared-balance accounting is
//! FIFO-equivalent: once all stock of a material flows through one balance,
//! there is no way to consume newer stock while older stock sits unused.
//!
//! The ledger also performs the structural feasibility pre-check: if the firm
//! outflow committed through some period exceeds everything that could
//! possibly have arrived by then, no schedule exists and the solver need not
//! be invoked.
use crate::contract::ContractID;
use crate::error::{PlanError, PlanResult};
use crate::horizon::Period;
use crate::material::MaterialID;
use crate::model::Model;
use itertools::Itertools;

/// Tolerance applied to the cumulative sums, in tonnes. Guards against
/// accumulation noise misreporting an exactly-balanced plan as infeasible.
const BALANCE_TOLERANCE: f64 = 1e-6;

/// The constraint plan derived from the FIFO ordering rules.
///
/// The keys fix the order in which the model builder emits rows; building the
/// same ledger twice yields the same keys in the same order.
#[derive(Debug)]
pub struct LotLedger {
    balance_keys: Vec<(MaterialID, Period)>,
    fulfilment_keys: Vec<ContractID>,
}

impl LotLedger {
    /// Derive the constraint plan for a model, checking structural feasibility.
    ///
    /// # Returns
    ///
    /// The ledger, or [`PlanError::StructurallyInfeasible`] if the cumulative
    /// balance arithmetic proves no schedule can exist.
    pub fn from_model(model: &Model) -> PlanResult<Self> {
        check_cumulative_balances(model)?;

        let balance_keys = model
            .materials
            .keys()
            .cloned()
            .cartesian_product(model.horizon.iter())
            .collect();
        let fulfilment_keys = model
            .demand_contracts
            .iter()
            .map(|contract| contract.id.clone())
            .collect();

        Ok(Self {
            balance_keys,
            fulfilment_keys,
        })
    }

    /// One stock-balance row key per (material, period), in emission order
    pub fn balance_keys(&self) -> &[(MaterialID, Period)] {
        &self.balance_keys
    }

    /// One fulfilment row key per demand contract, in emission order
    pub fn fulfilment_keys(&self) -> &[ContractID] {
        &self.fulfilment_keys
    }
}

/// Check that cumulative committed outflow never outruns cumulative possible
/// inflow.
///
/// The inflow side counts committed supply plus full production capacity, i.e.
/// the most optimistic stock position; the outflow side counts only firm
/// demand (a soft contract's shortfall is a paid option, not an obligation).
/// The check is therefore sound but not complete: it never rejects a feasible
/// plan, and deeper infeasibilities are left for the solver to report.
fn check_cumulative_balances(model: &Model) -> PlanResult<()> {
    for material_id in model.materials.keys() {
        let mut possible_inflow = 0.0;
        let mut committed_outflow = 0.0;
        for period in model.horizon.iter() {
            possible_inflow += model.supply_quantity(material_id, period).value()
                + model.capacity(material_id, period).value();
            committed_outflow += model
                .demand_contracts_for(material_id, period)
                .filter(|c| c.is_firm())
                .map(|c| c.quantity.value())
                .sum::<f64>();

            if committed_outflow > possible_inflow + BALANCE_TOLERANCE {
                return Err(PlanError::structurally_infeasible(format!(
                    "firm demand for {material_id} through period {period} totals \
                     {committed_outflow} t but at most {possible_inflow} t can be made available"
                )));
            }
        }
    }

    Ok(())
}
