//! Code for building and solving the planning optimisation.
//!
//! This is where the registry and the ledger's constraint plan become an
//! actual linear program, and where the external solver is invoked. The solver
//! is treated as a black box: one blocking call, no retries, its status mapped
//! onto [`SolveOutcome`].
use crate::contract::ContractID;
use crate::horizon::Period;
use crate::ledger::LotLedger;
use crate::material::MaterialID;
use crate::model::{Model, ObjectiveSense};
use crate::units::Money;
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;

pub mod constraints;
use constraints::add_plan_constraints;

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just
/// refers to a particular column of the problem.
type Variable = highs::Col;

/// Represents the different decision variables of the plan
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VariableKey {
    /// Production of a material in a period
    Production(MaterialID, Period),
    /// Stock of a material carried out of a period
    Carry(MaterialID, Period),
    /// Quantity shipped against a demand contract
    Shipment(ContractID),
    /// Unserved quantity of a soft demand contract
    Shortfall(ContractID),
}

/// A map for easy lookup of variables in the problem.
///
/// The entries are ordered (see [`IndexMap`]) and the insertion order is the
/// column order of the problem, which is what ties primal values back to the
/// parameters each variable corresponds to.
#[derive(Default)]
pub struct VariableMap(IndexMap<VariableKey, Variable>);

impl VariableMap {
    /// Get the [`Variable`] corresponding to the given key.
    fn get(&self, key: &VariableKey) -> Variable {
        *self.0.get(key).expect("No variable found for given key")
    }

    fn production(&self, material_id: &MaterialID, period: Period) -> Variable {
        self.get(&VariableKey::Production(material_id.clone(), period))
    }

    fn carry(&self, material_id: &MaterialID, period: Period) -> Variable {
        self.get(&VariableKey::Carry(material_id.clone(), period))
    }

    fn shipment(&self, contract_id: &ContractID) -> Variable {
        self.get(&VariableKey::Shipment(contract_id.clone()))
    }

    fn shortfall(&self, contract_id: &ContractID) -> Variable {
        self.get(&VariableKey::Shortfall(contract_id.clone()))
    }

    /// Iterate over the variable keys in column order
    pub fn keys(&self) -> impl Iterator<Item = &VariableKey> {
        self.0.keys()
    }

    /// The number of variables in the map
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map contains no variables
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The assembled planning problem, ready for a single solver call
pub struct PlanProblem {
    problem: Problem,
    variables: VariableMap,
    /// Objective coefficient for each column, in column order
    costs: Vec<f64>,
    objective: ObjectiveSense,
    /// Cost of the committed supply contracts, a constant the LP cannot see
    fixed_procurement_cost: Money,
}

impl PlanProblem {
    /// The variables of the problem
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// The objective coefficient for each column, in column order
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// The number of constraint rows in the problem
    pub fn num_rows(&self) -> usize {
        self.problem.num_rows()
    }
}

/// Assemble the complete LP for a model.
///
/// Building is deterministic: calling this twice on the same model and ledger
/// yields structurally identical problems (same variable keys, bounds,
/// coefficients and rows, in the same order).
///
/// # Arguments
///
/// * `model` - The planning model
/// * `ledger` - The constraint plan derived from the FIFO ordering rules
pub fn build_problem(model: &Model, ledger: &LotLedger) -> PlanProblem {
    let mut problem = Problem::default();
    let mut costs = Vec::new();
    let variables = add_variables(&mut problem, &mut costs, model);
    add_plan_constraints(&mut problem, &variables, model, ledger);

    PlanProblem {
        problem,
        variables,
        costs,
        objective: model.objective,
        fixed_procurement_cost: model.total_procurement_cost(),
    }
}

/// Add variables to the optimisation problem.
///
/// Column order is production and carry for every (material, period), then
/// shipment (and shortfall, if the contract is soft) for every demand
/// contract. Supply quantities are committed constants and get no column.
///
/// # Returns
///
/// A [`VariableMap`] with the problem's variables as values.
fn add_variables(problem: &mut Problem, costs: &mut Vec<f64>, model: &Model) -> VariableMap {
    let mut variables = VariableMap::default();
    let mut add = |key: VariableKey, coeff: f64, var: Variable| {
        costs.push(coeff);
        let existing = variables.0.insert(key, var).is_some();
        assert!(!existing, "Duplicate entry for var");
    };

    // Cost terms lower the objective when maximising margin
    let sign = match model.objective {
        ObjectiveSense::MinimiseCost => 1.0,
        ObjectiveSense::MaximiseMargin => -1.0,
    };

    for (material_id, material) in &model.materials {
        for period in model.horizon.iter() {
            let coeff = sign * material.unit_cost.value();
            let capacity = model.capacity(material_id, period);
            let var = problem.add_column(coeff, 0.0..=capacity.value());
            add(VariableKey::Production(material_id.clone(), period), coeff, var);

            let coeff = sign * material.storage_cost.value();
            let var = problem.add_column(coeff, 0.0..);
            add(VariableKey::Carry(material_id.clone(), period), coeff, var);
        }
    }

    for contract in &model.demand_contracts {
        // Revenue only enters the margin objective; pure cost minimisation
        // takes the committed shipments as given.
        let coeff = match model.objective {
            ObjectiveSense::MinimiseCost => 0.0,
            ObjectiveSense::MaximiseMargin => contract.unit_price.value(),
        };
        let var = problem.add_column(coeff, 0.0..=contract.quantity.value());
        add(VariableKey::Shipment(contract.id.clone()), coeff, var);

        if let Some(penalty) = contract.shortfall_penalty {
            let coeff = sign * penalty.value();
            let var = problem.add_column(coeff, 0.0..=contract.quantity.value());
            add(VariableKey::Shortfall(contract.id.clone()), coeff, var);
        }
    }

    variables
}

/// The outcome of a single solver invocation.
///
/// Solver-reported failures are stage results for the caller, not errors; they
/// are passed through without diagnosis, repair or relaxation.
pub enum SolveOutcome {
    /// The solver found an optimal plan
    Optimal(Solution),
    /// The solver proved that no feasible plan exists
    Infeasible,
    /// The solver proved that the objective can be improved without bound
    Unbounded,
    /// The solver failed for any other reason
    SolverError(String),
}

/// The solution to the planning problem
pub struct Solution {
    solution: highs::Solution,
    variables: VariableMap,
    objective_value: Money,
}

impl Solution {
    /// Iterate over the variable keys with their primal values, in column order
    pub fn iter_values(&self) -> impl Iterator<Item = (&VariableKey, f64)> {
        self.variables
            .keys()
            .zip(self.solution.columns().iter().copied())
    }

    /// The primal value of the given variable
    pub fn value(&self, key: &VariableKey) -> f64 {
        let index = self
            .variables
            .0
            .get_index_of(key)
            .expect("No variable found for given key");
        self.solution.columns()[index]
    }

    /// The objective value, including the committed procurement cost
    pub fn objective_value(&self) -> Money {
        self.objective_value
    }
}

/// Solve the assembled problem with a single blocking solver call.
pub fn solve(plan: PlanProblem) -> SolveOutcome {
    let sense = match plan.objective {
        ObjectiveSense::MinimiseCost => Sense::Minimise,
        ObjectiveSense::MaximiseMargin => Sense::Maximise,
    };

    let mut highs_model = plan.problem.optimise(sense);
    configure_highs_logging(&mut highs_model);

    let solved = highs_model.solve();
    match solved.status() {
        HighsModelStatus::Optimal => {
            let solution = solved.get_solution();
            let objective_value = objective_value(
                &plan.costs,
                solution.columns(),
                plan.objective,
                plan.fixed_procurement_cost,
            );
            SolveOutcome::Optimal(Solution {
                solution,
                variables: plan.variables,
                objective_value,
            })
        }
        HighsModelStatus::Infeasible => SolveOutcome::Infeasible,
        HighsModelStatus::Unbounded => SolveOutcome::Unbounded,
        status => SolveOutcome::SolverError(format!("solver failed with status {status:?}")),
    }
}

/// Recompute the objective value from the coefficients and primal values.
///
/// HiGHS objectives carry no constant term, so the committed procurement cost
/// is applied here: added to a total cost, subtracted from a margin.
fn objective_value(
    costs: &[f64],
    columns: &[f64],
    objective: ObjectiveSense,
    fixed_procurement_cost: Money,
) -> Money {
    let lp_objective: f64 = costs.iter().zip(columns).map(|(c, x)| c * x).sum();
    match objective {
        ObjectiveSense::MinimiseCost => Money(lp_objective) + fixed_procurement_cost,
        ObjectiveSense::MaximiseMargin => Money(lp_objective) - fixed_procurement_cost,
    }
}

/// Configure logging for the HiGHS solver.
///
/// The solver's console chatter does not go via our logger, so it stays off
/// unless the user has asked for debug-level output.
fn configure_highs_logging(model: &mut highs::Model) {
    let verbose = std::env::var("ALOHPLAN_LOG_LEVEL")
        .is_ok_and(|level| {
            level.eq_ignore_ascii_case("debug") || level.eq_ignore_ascii_case("trace")
        });

    model.set_option("output_flag", verbose);
    model.set_option("log_to_console", verbose);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{conversion_model, model};
    use crate::units::MoneyPerTonne;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn solve_expecting_optimal(model: &Model) -> Solution {
        let ledger = LotLedger::from_model(model).unwrap();
        let problem = build_problem(model, &ledger);
        match solve(problem) {
            SolveOutcome::Optimal(solution) => solution,
            _ => panic!("Expected an optimal solution"),
        }
    }

    #[rstest]
    fn test_build_problem_idempotent(model: Model) {
        let ledger = LotLedger::from_model(&model).unwrap();
        let first = build_problem(&model, &ledger);
        let second = build_problem(&model, &ledger);

        assert!(first.variables().keys().eq(second.variables().keys()));
        assert_eq!(first.costs(), second.costs());
        assert_eq!(first.num_rows(), second.num_rows());
    }

    #[rstest]
    fn test_build_problem_shape(model: Model) {
        let ledger = LotLedger::from_model(&model).unwrap();
        let problem = build_problem(&model, &ledger);

        // production + carry for 1 material x 2 periods, shipment for 1 firm contract
        assert_eq!(problem.variables().len(), 5);
        // 2 balance rows + 1 fulfilment row; no storage limits in the fixture
        assert_eq!(problem.num_rows(), 3);
    }

    /// The two-period scenario: committed supply of 100 t in period 1 at cost
    /// 5, one firm delivery of 80 t due in period 2, capacity 100 t/period.
    /// Producing anything would only add cost, so the plan lives off the
    /// committed supply: 100 t in stock after period 1, 20 t left at the end.
    #[rstest]
    fn test_solve_two_period_scenario(model: Model) {
        let solution = solve_expecting_optimal(&model);

        let hydrate: MaterialID = "hydrate".into();
        let ship = solution.value(&VariableKey::Shipment("d1".into()));
        assert_approx_eq!(f64, ship, 80.0, epsilon = 1e-6);
        for period in [Period(1), Period(2)] {
            let produced = solution.value(&VariableKey::Production(hydrate.clone(), period));
            assert_approx_eq!(f64, produced, 0.0, epsilon = 1e-6);
        }
        assert_approx_eq!(
            f64,
            solution.value(&VariableKey::Carry(hydrate.clone(), Period(1))),
            100.0,
            epsilon = 1e-6
        );
        assert_approx_eq!(
            f64,
            solution.value(&VariableKey::Carry(hydrate, Period(2))),
            20.0,
            epsilon = 1e-6
        );

        // procurement 500 plus storage 0.1/t on 100 t then 20 t
        assert_approx_eq!(f64, solution.objective_value().value(), 512.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_solve_maximise_margin(mut model: Model) {
        model.objective = ObjectiveSense::MaximiseMargin;
        let solution = solve_expecting_optimal(&model);

        assert_approx_eq!(
            f64,
            solution.value(&VariableKey::Shipment("d1".into())),
            80.0,
            epsilon = 1e-6
        );
        // revenue 80 x 40 minus procurement 500 and storage 12
        assert_approx_eq!(f64, solution.objective_value().value(), 2688.0, epsilon = 1e-6);
    }

    /// Producing hydrate consumes bauxite; with no bauxite inflow the balance
    /// rows pin production to zero and the firm contract cannot be served. The
    /// structural check cannot see this, so it is the solver that reports it.
    #[rstest]
    fn test_solve_infeasible_via_conversion(conversion_model: Model) {
        let mut model = conversion_model;
        model.supply_contracts.clear();
        let ledger = LotLedger::from_model(&model).unwrap();
        let problem = build_problem(&model, &ledger);

        assert!(matches!(solve(problem), SolveOutcome::Infeasible));
    }

    /// A soft contract may be left short when serving it is impossible, at the
    /// penalty price.
    #[rstest]
    fn test_solve_soft_contract_shortfall(conversion_model: Model) {
        let mut model = conversion_model;
        model.supply_contracts.clear();
        for contract in &mut model.demand_contracts {
            contract.shortfall_penalty = Some(MoneyPerTonne(25.0));
        }

        let solution = solve_expecting_optimal(&model);
        assert_approx_eq!(
            f64,
            solution.value(&VariableKey::Shipment("d1".into())),
            0.0,
            epsilon = 1e-6
        );
        assert_approx_eq!(
            f64,
            solution.value(&VariableKey::Shortfall("d1".into())),
            80.0,
            epsilon = 1e-6
        );
        // nothing is bought or made; the whole objective is the penalty
        assert_approx_eq!(f64, solution.objective_value().value(), 2000.0, epsilon = 1e-6);
    }
}
