//! Common routines for handling input data.
use crate::generator::GeneratorMap;
use crate::model::{Model, ModelParameters};
use crate::tables::RaTables;
use anyhow::{Context, Result, bail, ensure};
use itertools::Itertools;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::fs;
use std::hash::Hash;
use std::path::Path;

mod generator;
use generator::read_generators;
mod requirement;
use requirement::read_requirements;
mod exceedance;
use exceedance::read_exceedance_values;
mod nqc;
use nqc::read_nqc_values;
mod cost;
use cost::read_ra_costs;
mod storage_adder;
use storage_adder::read_storage_adders;

/// Read a series of type `T`s from a CSV file.
///
/// Will raise an error if the file is empty.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    let vec = read_csv_internal(file_path)?;
    if vec.is_empty() {
        bail!("CSV file {} cannot be empty", file_path.display());
    }
    Ok(vec.into_iter())
}

/// Read a series of type `T`s from a CSV file.
///
/// A missing file is treated the same as an empty one.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv_optional<'a, T: DeserializeOwned + 'a>(
    file_path: &'a Path,
) -> Result<impl Iterator<Item = T> + 'a> {
    if !file_path.exists() {
        return Ok(Vec::new().into_iter());
    }

    let vec = read_csv_internal(file_path)?;
    Ok(vec.into_iter())
}

fn read_csv_internal<'a, T: DeserializeOwned + 'a>(file_path: &'a Path) -> Result<Vec<T>> {
    let vec = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .process_results(|iter| iter.collect_vec())
        .with_context(|| input_err_msg(file_path))?;

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Indicates whether the values in the slice are sorted in ascending order and unique.
pub fn is_sorted_and_unique<T: PartialOrd>(values: &[T]) -> bool {
    values.windows(2).all(|pair| pair[0] < pair[1])
}

/// Insert a key-value pair into a map, returning an error if the key already exists
pub fn try_insert<K, V>(map: &mut HashMap<K, V>, key: K, value: V) -> Result<()>
where
    K: Eq + Hash + Debug,
{
    ensure!(!map.contains_key(&key), "Duplicate entry for key {key:?}");
    map.insert(key, value);

    Ok(())
}

/// Check that a value read from file is finite and non-negative
pub fn check_non_negative<T: Display>(name: &str, value: f64, key: T) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "Invalid {name} for {key}: must be a finite number greater than or equal to zero"
    );

    Ok(())
}

/// Deserialise a boolean which may be written as `1`/`0` or `true`/`false` (any case)
pub fn deserialise_flag<'de, D>(deserialiser: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserialiser)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(D::Error::custom(format!(
            "Invalid boolean value '{other}': expected 1, 0, true or false"
        ))),
    }
}

/// Read a model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The static model data or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let domains = parameters.index_domains()?;

    let generators: GeneratorMap = read_generators(model_dir, &domains)?;
    let tables = RaTables {
        requirements: read_requirements(model_dir, &domains)?,
        exceedance: read_exceedance_values(model_dir, &domains)?,
        nqc: read_nqc_values(model_dir, &domains)?,
        costs: read_ra_costs(model_dir, &domains)?,
        storage_adders: read_storage_adders(model_dir, &domains)?,
    };

    Ok(Model {
        model_path: model_dir.to_path_buf(),
        parameters,
        domains,
        generators,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
        #[serde(deserialize_with = "deserialise_flag")]
        flag: bool,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn read_csv_works() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value,flag\nhello,1,1\nworld, 2 ,False\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap().collect();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                    flag: true,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                    flag: false,
                }
            ]
        );

        // File with no data (only column headers)
        let file_path = create_csv_file(dir.path(), "id,value,flag\n");
        assert!(read_csv::<Record>(&file_path).is_err());
        assert!(
            read_csv_optional::<Record>(&file_path)
                .unwrap()
                .next()
                .is_none()
        );

        // Missing file is only allowed for optional tables
        let missing = dir.path().join("missing.csv");
        assert!(read_csv::<Record>(&missing).is_err());
        assert!(read_csv_optional::<Record>(&missing).unwrap().next().is_none());
    }

    #[test]
    fn read_csv_bad_flag() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value,flag\nhello,1,yes\n");
        assert!(read_csv::<Record>(&file_path).is_err());
    }

    #[test]
    fn read_toml_works() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        // Invalid TOML
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }
        assert!(read_toml::<Value>(&file_path).is_err());
    }

    #[rstest]
    #[case(&[], true)]
    #[case(&[1], true)]
    #[case(&[1, 2], true)]
    #[case(&[1, 1], false)]
    #[case(&[2, 1], false)]
    fn is_sorted_and_unique_works(#[case] values: &[u32], #[case] expected: bool) {
        assert_eq!(is_sorted_and_unique(values), expected);
    }

    #[test]
    fn try_insert_works() {
        let mut map = HashMap::new();
        try_insert(&mut map, "a", 1).unwrap();
        assert!(try_insert(&mut map, "a", 2).is_err());
        assert_eq!(map["a"], 1);
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(10.0, true)]
    #[case(-1.0, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn check_non_negative_works(#[case] value: f64, #[case] valid: bool) {
        assert_eq!(check_non_negative("value", value, "key").is_ok(), valid);
    }
}
