//! Fixtures for tests

use crate::contract::{DemandContract, SupplyContract};
use crate::horizon::Period;
use crate::material::Material;
use crate::model::{Model, ObjectiveSense};
use crate::production::Conversion;
use crate::registry::Registry;
use crate::units::{MoneyPerTonne, Tonnes};
use rstest::fixture;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// A material with typical hydrate-grade costs
pub fn material(id: &str) -> Material {
    Material {
        id: id.into(),
        description: "Aluminium hydroxide".into(),
        unit_cost: MoneyPerTonne(2.0),
        storage_cost: MoneyPerTonne(0.1),
        max_storage_periods: None,
    }
}

#[fixture]
pub fn supply_contract() -> SupplyContract {
    SupplyContract {
        id: "s1".into(),
        material_id: "hydrate".into(),
        period: Period(1),
        quantity: Tonnes(100.0),
        unit_cost: MoneyPerTonne(5.0),
    }
}

#[fixture]
pub fn demand_contract() -> DemandContract {
    DemandContract {
        id: "d1".into(),
        material_id: "hydrate".into(),
        period: Period(2),
        quantity: Tonnes(80.0),
        unit_price: MoneyPerTonne(40.0),
        shortfall_penalty: None,
    }
}

/// The two-period, single-material scenario used throughout the tests:
/// committed supply of 100 t in period 1, one firm delivery of 80 t due in
/// period 2, production capacity of 100 t in each period.
#[fixture]
pub fn model(supply_contract: SupplyContract, demand_contract: DemandContract) -> Model {
    let mut registry = Registry::new();
    registry.register_period_count(2).unwrap();
    registry.add_material(material("hydrate")).unwrap();
    registry.add_supply_contract(supply_contract).unwrap();
    registry.add_demand_contract(demand_contract).unwrap();
    for period in [Period(1), Period(2)] {
        registry
            .set_capacity("hydrate".into(), period, Tonnes(100.0))
            .unwrap();
    }

    registry.finish(ObjectiveSense::MinimiseCost).unwrap()
}

/// A two-material variant: hydrate is produced from bauxite (2.5 t per tonne),
/// bauxite arrives under a committed contract and cannot be produced.
#[fixture]
pub fn conversion_model(demand_contract: DemandContract) -> Model {
    let mut registry = Registry::new();
    registry.register_period_count(2).unwrap();
    registry.add_material(material("hydrate")).unwrap();
    registry
        .add_material(Material {
            id: "bauxite".into(),
            description: "Bauxite feed".into(),
            unit_cost: MoneyPerTonne(0.0),
            storage_cost: MoneyPerTonne(0.0),
            max_storage_periods: None,
        })
        .unwrap();
    registry
        .add_supply_contract(SupplyContract {
            id: "s1".into(),
            material_id: "bauxite".into(),
            period: Period(1),
            quantity: Tonnes(250.0),
            unit_cost: MoneyPerTonne(3.0),
        })
        .unwrap();
    registry.add_demand_contract(demand_contract).unwrap();
    for period in [Period(1), Period(2)] {
        registry
            .set_capacity("hydrate".into(), period, Tonnes(100.0))
            .unwrap();
    }
    registry
        .add_conversion(Conversion {
            output_id: "hydrate".into(),
            input_id: "bauxite".into(),
            factor: 2.5,
        })
        .unwrap();

    registry.finish(ObjectiveSense::MinimiseCost).unwrap()
}

/// Write the [`model`] fixture's scenario as a model directory
pub fn write_model_dir(dir: &Path) {
    let write = |name: &str, contents: &str| {
        let mut file = File::create(dir.join(name)).unwrap();
        writeln!(file, "{contents}").unwrap();
    };

    write("model.toml", "[horizon]\nperiods = 2");
    write(
        "materials.csv",
        "id,description,unit_cost,storage_cost,max_storage_periods\n\
         hydrate,Aluminium hydroxide,2.0,0.1,",
    );
    write(
        "supply_contracts.csv",
        "id,material_id,period,quantity,unit_cost\ns1,hydrate,1,100,5.0",
    );
    write(
        "demand_contracts.csv",
        "id,material_id,period,quantity,unit_price,shortfall_penalty\nd1,hydrate,2,80,40.0,",
    );
    write(
        "capacities.csv",
        "material_id,period,capacity\nhydrate,1,100\nhydrate,2,100",
    );
}
