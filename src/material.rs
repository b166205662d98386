//! Code for working with materials.
//!
//! A material is any distinguishable substance in the plan: raw bauxite-derived
//! feed, intermediates, or finished aluminium hydroxide grades.
use crate::id::define_id_type;
use crate::input::read_vec_from_csv;
use crate::units::MoneyPerTonne;
use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

const MATERIALS_FILE_NAME: &str = "materials.csv";

define_id_type! {MaterialID}

/// A material within the plan
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Material {
    /// Unique identifier for the material (e.g. "hydrate")
    pub id: MaterialID,
    /// Text description of the material (e.g. "aluminium hydroxide")
    pub description: String,
    /// Cost of producing one tonne of this material
    pub unit_cost: MoneyPerTonne,
    /// Cost of holding one tonne in stock for one period
    #[serde(default = "zero_cost")]
    pub storage_cost: MoneyPerTonne,
    /// How many periods the material may be stored for; unlimited if absent
    pub max_storage_periods: Option<u32>,
}

fn zero_cost() -> MoneyPerTonne {
    MoneyPerTonne(0.0)
}

/// A map of materials, keyed and ordered by ID
pub type MaterialMap = IndexMap<MaterialID, Material>;

/// Read material records from the materials CSV file.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_materials(model_dir: &Path) -> Result<Vec<Material>> {
    read_vec_from_csv(&model_dir.join(MATERIALS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_materials() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MATERIALS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "id,description,unit_cost,storage_cost,max_storage_periods\n\
                 bauxite,Bauxite feed,0.0,0.1,\n\
                 hydrate,Aluminium hydroxide,12.0,0.4,2"
            )
            .unwrap();
        }

        let materials = read_materials(dir.path()).unwrap();
        assert_eq!(materials.len(), 2);
        assert_eq!(materials[0].id, "bauxite".into());
        assert_eq!(materials[0].max_storage_periods, None);
        assert_eq!(materials[1].unit_cost, MoneyPerTonne(12.0));
        assert_eq!(materials[1].max_storage_periods, Some(2));
    }
}
