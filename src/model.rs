//! The model represents the static input data provided by the user.
use crate::calendar::IndexDomains;
use crate::generator::{Generator, GeneratorMap};
use crate::tables::RaTables;
use std::path::PathBuf;
use std::rc::Rc;

pub mod parameters;
pub use parameters::{ModelParameters, SellExcessRA};

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// The periods, months and hours covered by the model
    pub domains: IndexDomains,
    /// The portfolio's generators
    pub generators: GeneratorMap,
    /// Parameter tables for RA accounting and procurement
    pub tables: RaTables,
}

impl Model {
    /// Iterate over the model's generators
    pub fn iter_generators(&self) -> impl Iterator<Item = &Rc<Generator>> {
        self.generators.values()
    }

    /// Whether procurement may go negative to represent sales of surplus RA
    pub fn sell_excess_ra(&self) -> bool {
        self.parameters.sell_excess_ra == SellExcessRA::Sell
    }
}
