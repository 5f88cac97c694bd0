//! The plugin contract.
//!
//! A plugin provides a [`ProcessorFactory`]. The factory declares which
//! indicators it can derive and builds a [`Processor`] bound to a subset of
//! them. Processors come in two variants, distinguished by their input:
//! raw observation time series or named variable rasters.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::error::Result;
use crate::indicator::{IndicatorArrays, IndicatorDescription};
use crate::observations::ObservationWindow;

/// Derives indicators from a window of raw observations.
pub trait ObservationProcessor {
    fn name(&self) -> &str;

    /// Data types of the observation files this processor reads.
    fn supported_data_types(&self) -> Vec<String>;

    fn process_observations(&self, window: &ObservationWindow<'_>) -> Result<IndicatorArrays>;
}

/// Derives indicators from variable rasters already on the destination grid.
pub trait VariableProcessor {
    fn name(&self) -> &str;

    fn process_variables(&self, variables: &BTreeMap<String, Array2<f32>>)
    -> Result<IndicatorArrays>;
}

pub enum Processor {
    Observation(Box<dyn ObservationProcessor>),
    Variable(Box<dyn VariableProcessor>),
}

impl Processor {
    pub fn name(&self) -> &str {
        match self {
            Processor::Observation(processor) => processor.name(),
            Processor::Variable(processor) => processor.name(),
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Processor::Observation(p) => write!(f, "Processor::Observation({})", p.name()),
            Processor::Variable(p) => write!(f, "Processor::Variable({})", p.name()),
        }
    }
}

/// Entry point of a plugin.
pub trait ProcessorFactory {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn indicator_descriptions(&self) -> Vec<IndicatorDescription>;

    /// Creates a processor that derives `indicator_names`.
    fn create_processor(&self, indicator_names: &[String]) -> Processor;
}
