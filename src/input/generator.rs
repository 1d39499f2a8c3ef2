//! Code for reading [`Generator`]s and their capacities from CSV files.
use super::{check_non_negative, deserialise_flag, input_err_msg, read_csv, try_insert};
use crate::calendar::{IndexDomains, Period};
use crate::generator::{CapacityMap, Generator, GeneratorID, GeneratorMap};
use crate::units::{Capacity, Hours};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

const GENERATORS_FILE_NAME: &str = "generation_projects_info.csv";
const GENERATOR_CAPACITY_FILE_NAME: &str = "gen_capacity.csv";

/// Represents a row of the generation projects CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct GeneratorRaw {
    generation_project: String,
    #[serde(deserialize_with = "deserialise_flag")]
    gen_is_ra_eligible: bool,
    #[serde(deserialize_with = "deserialise_flag")]
    gen_is_variable: bool,
    #[serde(default, deserialize_with = "deserialise_flag")]
    gen_is_storage: bool,
    gen_tech_sod: String,
    region_sod: String,
    #[serde(default)]
    resource_id_sod: Option<String>,
    #[serde(default)]
    storage_energy_to_power_ratio: Option<Hours>,
}

impl GeneratorRaw {
    fn validate(&self) -> Result<()> {
        ensure!(
            !self.generation_project.is_empty(),
            "Generation project IDs cannot be empty"
        );

        if self.gen_is_storage {
            let ratio = self.storage_energy_to_power_ratio.with_context(|| {
                format!(
                    "Storage project {} must have a storage_energy_to_power_ratio",
                    self.generation_project
                )
            })?;
            ensure!(
                ratio.is_finite() && ratio > Hours(0.0),
                "storage_energy_to_power_ratio for {} must be a finite number greater than zero",
                self.generation_project
            );
        }

        Ok(())
    }
}

/// Represents a row of the generator capacity CSV file
#[derive(PartialEq, Debug, Deserialize)]
struct GeneratorCapacityRaw {
    generation_project: String,
    period: Period,
    capacity_mw: Capacity,
}

/// Read generators and their capacities from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `domains` - The model's index domains
///
/// # Returns
///
/// A map of [`Generator`]s, keyed by ID, or an error.
pub fn read_generators(model_dir: &Path, domains: &IndexDomains) -> Result<GeneratorMap> {
    let file_path = model_dir.join(GENERATORS_FILE_NAME);
    let generators_csv = read_csv(&file_path)?;
    let mut generators =
        read_generators_from_iter(generators_csv).with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(GENERATOR_CAPACITY_FILE_NAME);
    let capacities_csv = read_csv(&file_path)?;
    let mut capacities = read_capacities_from_iter(capacities_csv, &generators, domains)
        .with_context(|| input_err_msg(&file_path))?;

    for generator in generators.values_mut() {
        match capacities.remove(&generator.id) {
            Some(capacity) => generator.capacity = capacity,
            None => warn!(
                "Generation project {} has no capacity in any period",
                generator.id
            ),
        }
    }

    Ok(generators
        .into_iter()
        .map(|(id, generator)| (id, Rc::new(generator)))
        .collect())
}

fn read_generators_from_iter<I>(iter: I) -> Result<IndexMap<GeneratorID, Generator>>
where
    I: Iterator<Item = GeneratorRaw>,
{
    let mut generators = IndexMap::new();
    for raw in iter {
        raw.validate()?;

        let id: GeneratorID = raw.generation_project.as_str().into();
        let generator = Generator {
            id: id.clone(),
            ra_eligible: raw.gen_is_ra_eligible,
            is_variable: raw.gen_is_variable,
            is_storage: raw.gen_is_storage,
            technology: raw.gen_tech_sod.into(),
            region: raw.region_sod.into(),
            resource_id: raw
                .resource_id_sod
                .filter(|resource_id| !resource_id.is_empty())
                .map(Into::into),
            capacity: CapacityMap::new(),
            energy_to_power_ratio: raw.storage_energy_to_power_ratio,
        };

        ensure!(
            generators.insert(id.clone(), generator).is_none(),
            "Duplicate generation project ID found: {id}"
        );
    }

    Ok(generators)
}

fn read_capacities_from_iter<I>(
    iter: I,
    generators: &IndexMap<GeneratorID, Generator>,
    domains: &IndexDomains,
) -> Result<HashMap<GeneratorID, CapacityMap>>
where
    I: Iterator<Item = GeneratorCapacityRaw>,
{
    let mut map: HashMap<GeneratorID, CapacityMap> = HashMap::new();
    for raw in iter {
        let (id, _) = generators
            .get_key_value(raw.generation_project.as_str())
            .with_context(|| format!("Unknown generation project {}", raw.generation_project))?;

        // Capacity for periods outside the model is ignored
        if !domains.periods().contains(&raw.period) {
            continue;
        }

        check_non_negative("capacity_mw", raw.capacity_mw.value(), id)?;
        try_insert(
            map.entry(id.clone()).or_default(),
            raw.period,
            raw.capacity_mw,
        )
        .with_context(|| format!("Duplicate capacity for generation project {id}"))?;
    }

    Ok(map)
}
