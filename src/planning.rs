//! Functionality for running the planning stage.
//!
//! One batch computation: derive the ledger's constraint plan, build the
//! problem, make a single blocking solver call and project the result. Each
//! phase exclusively owns its data until handoff; nothing is mutated once
//! the problem has been built.
use crate::error::PlanResult;
use crate::ledger::LotLedger;
use crate::model::Model;
use crate::optimisation::{SolveOutcome, build_problem, solve};
use crate::schedule::{PlanSchedule, extract_schedule};
use log::info;

/// The reportable result of the planning stage.
///
/// Solver-reported failures are stage results, not process failures; the
/// caller decides what to do with them.
#[derive(Debug)]
pub enum PlanOutcome {
    /// The solver found an optimal plan
    Optimal(PlanSchedule),
    /// The solver proved that no feasible plan exists
    Infeasible,
    /// The solver proved that the objective can be improved without bound
    Unbounded,
    /// The solver failed for any other reason
    SolverError(String),
}

/// Run the planning stage for a model.
///
/// # Arguments
///
/// * `model` - The model to plan
///
/// # Returns
///
/// The outcome of the solve, or a [`PlanError`](crate::error::PlanError) if
/// the inputs fail the structural feasibility check.
pub fn run(model: &Model) -> PlanResult<PlanOutcome> {
    let ledger = LotLedger::from_model(model)?;
    info!("Structural feasibility check passed");

    let problem = build_problem(model, &ledger);
    info!(
        "Assembled problem with {} variables and {} constraints",
        problem.variables().len(),
        problem.num_rows()
    );

    Ok(match solve(problem) {
        SolveOutcome::Optimal(solution) => {
            info!(
                "Optimal plan found with objective value {}",
                solution.objective_value().value()
            );
            PlanOutcome::Optimal(extract_schedule(model, &solution))
        }
        SolveOutcome::Infeasible => PlanOutcome::Infeasible,
        SolveOutcome::Unbounded => PlanOutcome::Unbounded,
        SolveOutcome::SolverError(message) => PlanOutcome::SolverError(message),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::fixture::model;
    use crate::units::Tonnes;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_run_optimal(model: Model) {
        let PlanOutcome::Optimal(schedule) = run(&model).unwrap() else {
            panic!("Expected an optimal outcome");
        };

        // conservation of input: the committed 100 t show up as stock or shipment
        let shipped: Tonnes = schedule.shipments.iter().map(|row| row.quantity).sum();
        let final_stock = schedule.inventory.last().unwrap().quantity;
        assert_approx_eq!(f64, (shipped + final_stock).value(), 100.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_run_structurally_infeasible(mut model: Model) {
        model.supply_contracts.clear();
        model.capacities = crate::production::CapacityMap::new();

        assert!(matches!(
            run(&model).unwrap_err(),
            PlanError::StructurallyInfeasible(_)
        ));
    }
}
