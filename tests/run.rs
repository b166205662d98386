//! End-to-end tests: load the demo model, solve it and check the plan.
use alohplan::horizon::Period;
use alohplan::material::MaterialID;
use alohplan::model::Model;
use alohplan::planning::{PlanOutcome, run};
use alohplan::schedule::PlanSchedule;
use float_cmp::assert_approx_eq;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Get the path to the bundled demo model.
fn get_model_dir() -> PathBuf {
    Path::new(file!())
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
        .join("simple")
}

fn solve_demo_model() -> (Model, PlanSchedule) {
    let model = Model::from_path(get_model_dir()).unwrap();
    let PlanOutcome::Optimal(schedule) = run(&model).unwrap() else {
        panic!("Expected an optimal outcome");
    };
    (model, schedule)
}

type Grid = HashMap<(MaterialID, Period), f64>;

fn grids(model: &Model, schedule: &PlanSchedule) -> (Grid, Grid, Grid) {
    let production: Grid = schedule
        .production
        .iter()
        .map(|row| ((row.material_id.clone(), row.period), row.quantity.value()))
        .collect();
    let carry: Grid = schedule
        .inventory
        .iter()
        .map(|row| ((row.material_id.clone(), row.period), row.quantity.value()))
        .collect();

    let mut shipped = Grid::new();
    for row in &schedule.shipments {
        *shipped
            .entry((row.material_id.clone(), row.period))
            .or_default() += row.quantity.value();
    }
    for material_id in model.materials.keys() {
        for period in model.horizon.iter() {
            shipped.entry((material_id.clone(), period)).or_default();
        }
    }

    (production, carry, shipped)
}

/// All firm contracts ship exactly their committed quantity; the soft
/// contract also ships in full here because its penalty exceeds the cost of
/// producing.
#[test]
fn test_contract_fulfilment() {
    let (model, schedule) = solve_demo_model();

    assert_eq!(schedule.shipments.len(), model.demand_contracts.len());
    for (row, contract) in schedule.shipments.iter().zip(&model.demand_contracts) {
        assert_eq!(row.contract_id, contract.id);
        assert_eq!(row.period, contract.period);
        assert_approx_eq!(
            f64,
            row.quantity.value(),
            contract.quantity.value(),
            epsilon = 1e-6
        );
    }
}

/// Material balance holds for every (material, period):
/// carry-in + supply + production - conversion use - shipments - carry-out = 0,
/// with carry never negative. This is the FIFO ledger's accounting identity.
#[test]
fn test_material_balance() {
    let (model, schedule) = solve_demo_model();
    let (production, carry, shipped) = grids(&model, &schedule);

    for material_id in model.materials.keys() {
        let mut carry_in = 0.0;
        for period in model.horizon.iter() {
            let key = (material_id.clone(), period);
            let inflow = model.supply_quantity(material_id, period).value() + production[&key];
            let conversion_use: f64 = model
                .conversions_consuming(material_id)
                .map(|c| c.factor * production[&(c.output_id.clone(), period)])
                .sum();
            let carry_out = carry[&key];
            assert!(carry_out >= -1e-6);

            assert_approx_eq!(
                f64,
                carry_in + inflow - conversion_use - shipped[&key] - carry_out,
                0.0,
                epsilon = 1e-6
            );
            carry_in = carry_out;
        }
    }
}

/// Production never exceeds the per-period capacity.
#[test]
fn test_capacity_limits() {
    let (model, schedule) = solve_demo_model();

    for row in &schedule.production {
        let capacity = model.capacity(&row.material_id, row.period);
        assert!(row.quantity.value() <= capacity.value() + 1e-6);
        assert!(row.quantity.value() >= -1e-6);
    }
}

/// The objective value of the demo model: 240 t of hydrate at 12/t, bauxite
/// procurement at its committed prices, plus bauxite storage. Production is
/// just-in-time (hydrate storage is dearer than bauxite storage), so the
/// bauxite stock profile is 250/300/225/50 t at 0.05/t per period.
#[test]
fn test_objective_value() {
    let (_, schedule) = solve_demo_model();
    assert_approx_eq!(f64, schedule.objective_value.value(), 4901.25, epsilon = 1e-3);
}
