//! The module responsible for writing output data to disk.
use crate::schedule::PlanSchedule;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
pub const OUTPUT_DIRECTORY_ROOT: &str = "alohplan_results";

/// The output file name for the production schedule
const PRODUCTION_FILE_NAME: &str = "production.csv";

/// The output file name for the shipment schedule
const SHIPMENTS_FILE_NAME: &str = "shipments.csv";

/// The output file name for the carried-inventory schedule
const INVENTORY_FILE_NAME: &str = "inventory.csv";

/// Get the default output directory for the model at the specified path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create the output directory for a model, with parents.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Write the three schedules of an optimal plan to CSV files.
///
/// # Arguments
///
/// * `output_dir` - The directory to write the files to
/// * `schedule` - The schedules extracted from an optimal solution
pub fn write_schedule(output_dir: &Path, schedule: &PlanSchedule) -> Result<()> {
    write_rows_to_csv(&output_dir.join(PRODUCTION_FILE_NAME), &schedule.production)?;
    write_rows_to_csv(&output_dir.join(SHIPMENTS_FILE_NAME), &schedule.shipments)?;
    write_rows_to_csv(&output_dir.join(INVENTORY_FILE_NAME), &schedule.inventory)?;

    Ok(())
}

fn write_rows_to_csv<T: Serialize>(file_path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horizon::Period;
    use crate::schedule::{CarryRow, ProductionRow, ShipmentRow};
    use crate::units::{Money, Tonnes};
    use std::fs;
    use tempfile::tempdir;

    fn schedule() -> PlanSchedule {
        PlanSchedule {
            production: vec![ProductionRow {
                material_id: "hydrate".into(),
                period: Period(1),
                quantity: Tonnes(100.0),
            }],
            shipments: vec![ShipmentRow {
                contract_id: "d1".into(),
                material_id: "hydrate".into(),
                period: Period(2),
                quantity: Tonnes(80.0),
            }],
            inventory: vec![CarryRow {
                material_id: "hydrate".into(),
                period: Period(1),
                quantity: Tonnes(20.0),
            }],
            objective_value: Money(512.0),
        }
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("some").join("output");
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());

        // idempotent
        create_output_directory(&output_dir).unwrap();
    }

    #[test]
    fn test_write_schedule() {
        let dir = tempdir().unwrap();
        write_schedule(dir.path(), &schedule()).unwrap();

        let contents = fs::read_to_string(dir.path().join(PRODUCTION_FILE_NAME)).unwrap();
        assert_eq!(contents, "material_id,period,quantity\nhydrate,1,100.0\n");
        let contents = fs::read_to_string(dir.path().join(SHIPMENTS_FILE_NAME)).unwrap();
        assert_eq!(
            contents,
            "contract_id,material_id,period,quantity\nd1,hydrate,2,80.0\n"
        );
        let contents = fs::read_to_string(dir.path().join(INVENTORY_FILE_NAME)).unwrap();
        assert_eq!(contents, "material_id,period,quantity\nhydrate,1,20.0\n");
    }
}
