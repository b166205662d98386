//! The registry validates and accumulates the planning inputs.
//!
//! All records are checked as they are registered, so a [`Model`] built from a
//! registry is known to be well-formed before any constraint is generated.
use crate::contract::{ContractID, DemandContract, SupplyContract};
use crate::error::{PlanError, PlanResult};
use crate::horizon::{Horizon, Period};
use crate::material::{Material, MaterialID, MaterialMap};
use crate::model::{Model, ObjectiveSense};
use crate::production::{CapacityMap, Conversion};
use crate::units::Tonnes;
use std::collections::HashSet;

/// Accumulates validated planning inputs prior to model construction.
///
/// The registry has no side effects beyond accumulating records; once
/// [`Registry::finish`] has produced a [`Model`], nothing can be mutated.
#[derive(Default)]
pub struct Registry {
    horizon: Option<Horizon>,
    materials: MaterialMap,
    supply_contracts: Vec<SupplyContract>,
    demand_contracts: Vec<DemandContract>,
    contract_ids: HashSet<ContractID>,
    capacities: CapacityMap,
    conversions: Vec<Conversion>,
}

impl Registry {
    /// Create a new, empty [`Registry`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the number of periods in the planning horizon.
    ///
    /// Must be called exactly once, before any contract or capacity is added.
    pub fn register_period_count(&mut self, n_periods: u32) -> PlanResult<()> {
        if self.horizon.is_some() {
            return Err(PlanError::config("horizon already registered"));
        }

        self.horizon = Some(Horizon::new(n_periods)?);
        Ok(())
    }

    /// Register a material.
    pub fn add_material(&mut self, material: Material) -> PlanResult<()> {
        if self.materials.contains_key(&material.id) {
            return Err(PlanError::config(format!(
                "duplicate material ID {}",
                material.id
            )));
        }

        self.materials.insert(material.id.clone(), material);
        Ok(())
    }

    /// Register a committed raw-material delivery.
    pub fn add_supply_contract(&mut self, contract: SupplyContract) -> PlanResult<()> {
        self.check_contract_common(
            &contract.id,
            &contract.material_id,
            contract.period,
            contract.quantity,
        )?;
        self.supply_contracts.push(contract);
        Ok(())
    }

    /// Register a committed customer delivery.
    pub fn add_demand_contract(&mut self, contract: DemandContract) -> PlanResult<()> {
        self.check_contract_common(
            &contract.id,
            &contract.material_id,
            contract.period,
            contract.quantity,
        )?;
        if let Some(penalty) = contract.shortfall_penalty {
            if penalty < crate::units::MoneyPerTonne(0.0) {
                return Err(PlanError::config(format!(
                    "negative shortfall penalty for contract {}",
                    contract.id
                )));
            }
        }
        self.demand_contracts.push(contract);
        Ok(())
    }

    /// Register a production capacity for a material in a period.
    pub fn set_capacity(
        &mut self,
        material_id: MaterialID,
        period: Period,
        capacity: Tonnes,
    ) -> PlanResult<()> {
        self.check_material(&material_id)?;
        self.check_period(period)?;
        if capacity < Tonnes::ZERO {
            return Err(PlanError::config(format!(
                "negative capacity for {material_id} in period {period}"
            )));
        }

        self.capacities.insert(material_id, period, capacity);
        Ok(())
    }

    /// Register a conversion from an input material to an output material.
    pub fn add_conversion(&mut self, conversion: Conversion) -> PlanResult<()> {
        self.check_material(&conversion.output_id)?;
        self.check_material(&conversion.input_id)?;
        if conversion.output_id == conversion.input_id {
            return Err(PlanError::config(format!(
                "conversion for {} consumes itself",
                conversion.output_id
            )));
        }
        if conversion.factor <= 0.0 {
            return Err(PlanError::config(format!(
                "conversion factor for {} must be positive",
                conversion.output_id
            )));
        }
        if self
            .conversions
            .iter()
            .any(|c| c.output_id == conversion.output_id && c.input_id == conversion.input_id)
        {
            return Err(PlanError::config(format!(
                "duplicate conversion from {} to {}",
                conversion.input_id, conversion.output_id
            )));
        }

        self.conversions.push(conversion);
        Ok(())
    }

    /// The production capacity for the given material and period.
    ///
    /// Defaults to zero if unspecified; there is no implicit unlimited capacity.
    pub fn capacity(&self, material_id: &MaterialID, period: Period) -> Tonnes {
        self.capacities.get(material_id, period)
    }

    /// Consume the registry and produce an immutable [`Model`].
    pub fn finish(self, objective: ObjectiveSense) -> PlanResult<Model> {
        let horizon = self
            .horizon
            .ok_or_else(|| PlanError::config("no horizon registered"))?;

        Ok(Model::new(
            horizon,
            self.materials,
            self.supply_contracts,
            self.demand_contracts,
            self.capacities,
            self.conversions,
            objective,
        ))
    }

    fn check_contract_common(
        &mut self,
        id: &ContractID,
        material_id: &MaterialID,
        period: Period,
        quantity: Tonnes,
    ) -> PlanResult<()> {
        self.check_material(material_id)?;
        self.check_period(period)?;
        if quantity < Tonnes::ZERO {
            return Err(PlanError::config(format!(
                "negative quantity for contract {id}"
            )));
        }
        if !self.contract_ids.insert(id.clone()) {
            return Err(PlanError::config(format!("duplicate contract ID {id}")));
        }

        Ok(())
    }

    fn check_period(&self, period: Period) -> PlanResult<()> {
        let horizon = self
            .horizon
            .as_ref()
            .ok_or_else(|| PlanError::config("no horizon registered"))?;
        if !horizon.contains(period) {
            return Err(PlanError::config(format!(
                "period {period} is outside the horizon 1..={}",
                horizon.n_periods()
            )));
        }

        Ok(())
    }

    fn check_material(&self, material_id: &MaterialID) -> PlanResult<()> {
        if !self.materials.contains_key(material_id) {
            return Err(PlanError::config(format!("unknown material {material_id}")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{demand_contract, material, supply_contract};
    use crate::units::MoneyPerTonne;
    use rstest::rstest;

    fn registry_with_horizon(n_periods: u32) -> Registry {
        let mut registry = Registry::new();
        registry.register_period_count(n_periods).unwrap();
        registry.add_material(material("hydrate")).unwrap();
        registry
    }

    #[test]
    fn test_register_period_count() {
        let mut registry = Registry::new();
        assert!(registry.register_period_count(0).is_err());
        assert!(registry.register_period_count(2).is_ok());
        assert_eq!(
            registry.register_period_count(2).unwrap_err(),
            PlanError::config("horizon already registered")
        );
    }

    #[rstest]
    fn test_add_supply_contract(supply_contract: SupplyContract) {
        let mut registry = registry_with_horizon(2);
        assert!(registry.add_supply_contract(supply_contract).is_ok());
    }

    #[rstest]
    fn test_add_contract_period_out_of_range(mut supply_contract: SupplyContract) {
        let mut registry = registry_with_horizon(2);
        supply_contract.period = Period(3);
        assert_eq!(
            registry.add_supply_contract(supply_contract).unwrap_err(),
            PlanError::config("period 3 is outside the horizon 1..=2")
        );
    }

    #[rstest]
    fn test_add_contract_negative_quantity(mut demand_contract: DemandContract) {
        let mut registry = registry_with_horizon(2);
        demand_contract.quantity = Tonnes(-1.0);
        assert_eq!(
            registry.add_demand_contract(demand_contract).unwrap_err(),
            PlanError::config("negative quantity for contract d1")
        );
    }

    #[rstest]
    fn test_add_contract_unknown_material(mut demand_contract: DemandContract) {
        let mut registry = registry_with_horizon(2);
        demand_contract.material_id = "alumina".into();
        assert_eq!(
            registry.add_demand_contract(demand_contract).unwrap_err(),
            PlanError::config("unknown material alumina")
        );
    }

    #[rstest]
    fn test_add_contract_duplicate_id(
        supply_contract: SupplyContract,
        mut demand_contract: DemandContract,
    ) {
        let mut registry = registry_with_horizon(2);
        demand_contract.id = supply_contract.id.clone();
        registry.add_supply_contract(supply_contract).unwrap();
        assert_eq!(
            registry.add_demand_contract(demand_contract).unwrap_err(),
            PlanError::config("duplicate contract ID s1")
        );
    }

    #[test]
    fn test_capacity_defaults_to_zero() {
        let mut registry = registry_with_horizon(2);
        registry
            .set_capacity("hydrate".into(), Period(1), Tonnes(100.0))
            .unwrap();

        assert_eq!(registry.capacity(&"hydrate".into(), Period(1)), Tonnes(100.0));
        assert_eq!(registry.capacity(&"hydrate".into(), Period(2)), Tonnes::ZERO);
    }

    #[test]
    fn test_set_capacity_negative() {
        let mut registry = registry_with_horizon(2);
        assert!(
            registry
                .set_capacity("hydrate".into(), Period(1), Tonnes(-5.0))
                .is_err()
        );
    }

    #[test]
    fn test_add_conversion() {
        let mut registry = registry_with_horizon(2);
        registry
            .add_material(Material {
                id: "bauxite".into(),
                description: "Bauxite feed".into(),
                unit_cost: MoneyPerTonne(0.0),
                storage_cost: MoneyPerTonne(0.0),
                max_storage_periods: None,
            })
            .unwrap();

        let conversion = Conversion {
            output_id: "hydrate".into(),
            input_id: "bauxite".into(),
            factor: 2.5,
        };
        assert!(registry.add_conversion(conversion.clone()).is_ok());

        let self_consuming = Conversion {
            input_id: "hydrate".into(),
            ..conversion.clone()
        };
        assert!(registry.add_conversion(self_consuming).is_err());

        let non_positive = Conversion {
            factor: 0.0,
            ..conversion.clone()
        };
        assert!(registry.add_conversion(non_positive).is_err());

        assert_eq!(
            registry.add_conversion(conversion).unwrap_err(),
            PlanError::config("duplicate conversion from bauxite to hydrate")
        );
    }

    #[test]
    fn test_finish_requires_horizon() {
        let registry = Registry::new();
        assert_eq!(
            registry.finish(ObjectiveSense::MinimiseCost).unwrap_err(),
            PlanError::config("no horizon registered")
        );
    }
}
