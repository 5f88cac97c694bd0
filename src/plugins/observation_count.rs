use ndarray::Array2;

use super::{OBSERVATION_COUNT, bound_indicators};
use crate::error::Result;
use crate::indicator::{IndicatorArrays, IndicatorDescription};
use crate::observations::ObservationWindow;
use crate::processor::{ObservationProcessor, Processor, ProcessorFactory};

pub const DEFAULT_DATA_TYPE: &str = "observation";

/// Per-pixel number of valid observations in each window.
#[derive(Debug, Clone)]
pub struct ObservationCountFactory {
    data_types: Vec<String>,
}

impl ObservationCountFactory {
    pub fn new(data_types: Vec<String>) -> Self {
        Self { data_types }
    }
}

impl Default for ObservationCountFactory {
    fn default() -> Self {
        Self::new(vec![DEFAULT_DATA_TYPE.to_string()])
    }
}

impl ProcessorFactory for ObservationCountFactory {
    fn name(&self) -> &str {
        OBSERVATION_COUNT
    }

    fn description(&self) -> &str {
        "Counts the valid observations of each pixel between two acquisition dates"
    }

    fn indicator_descriptions(&self) -> Vec<IndicatorDescription> {
        vec![IndicatorDescription::new(
            OBSERVATION_COUNT,
            "Number of finite observation values per pixel",
        )]
    }

    fn create_processor(&self, indicator_names: &[String]) -> Processor {
        Processor::Observation(Box::new(ObservationCount {
            data_types: self.data_types.clone(),
            indicators: bound_indicators(indicator_names, OBSERVATION_COUNT),
        }))
    }
}

struct ObservationCount {
    data_types: Vec<String>,
    indicators: Vec<String>,
}

impl ObservationProcessor for ObservationCount {
    fn name(&self) -> &str {
        OBSERVATION_COUNT
    }

    fn supported_data_types(&self) -> Vec<String> {
        self.data_types.clone()
    }

    fn process_observations(&self, window: &ObservationWindow<'_>) -> Result<IndicatorArrays> {
        let mut results = IndicatorArrays::new();
        if self.indicators.is_empty() {
            return Ok(results);
        }

        let grid = window.reprojection().grid();
        let mut count = Array2::<f32>::zeros((grid.height, grid.width));
        for file_ref in window.observations() {
            let data = window.read(file_ref)?;
            count.zip_mut_with(&data, |c, v| {
                if v.is_finite() {
                    *c += 1.0;
                }
            });
        }

        for indicator in &self.indicators {
            results.insert(indicator.clone(), count.clone());
        }
        Ok(results)
    }
}
