//! Common routines for handling input data.
use anyhow::{Context, Result, ensure};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Read a series of type `T`s from a CSV file into a `Vec<T>`.
///
/// The file must exist and contain at least one record.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_vec_from_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_records(file_path)?;
    ensure!(
        !vec.is_empty(),
        "CSV file {} cannot be empty",
        file_path.display()
    );

    Ok(vec)
}

/// Read a series of type `T`s from a CSV file which may be absent.
///
/// A missing file is treated as an empty record set.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_vec_from_csv_optional<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    if !file_path.is_file() {
        return Ok(Vec::new());
    }

    read_csv_records(file_path)
}

fn read_csv_records<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path)
        .with_context(|| format!("Could not read {}", file_path.display()))?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        let record: T =
            result.with_context(|| format!("Error reading {}", file_path.display()))?;
        vec.push(record);
    }

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path)
        .with_context(|| format!("Could not read {}", file_path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Error parsing {}", file_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        quantity: f64,
    }

    #[test]
    fn test_read_vec_from_csv() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,quantity\na,1.0\nb,2.5").unwrap();
        }

        let records: Vec<Record> = read_vec_from_csv(&file_path).unwrap();
        assert_eq!(
            records,
            vec![
                Record {
                    id: "a".to_string(),
                    quantity: 1.0
                },
                Record {
                    id: "b".to_string(),
                    quantity: 2.5
                }
            ]
        );
    }

    #[test]
    fn test_read_vec_from_csv_empty() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("records.csv");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id,quantity").unwrap();
        }

        assert!(read_vec_from_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn test_read_vec_from_csv_optional_missing() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv"); // NB: doesn't exist

        let records: Vec<Record> = read_vec_from_csv_optional(&file_path).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("record.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "id = \"a\"\nquantity = 1.0").unwrap();
        }

        let record: Record = read_toml(&file_path).unwrap();
        assert_eq!(
            record,
            Record {
                id: "a".to_string(),
                quantity: 1.0
            }
        );
        assert!(read_toml::<Record>(&dir.path().join("missing.toml")).is_err());
    }
}
