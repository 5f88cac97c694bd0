use std::collections::BTreeMap;

use ndarray::Array2;

use super::{VARIABLE_MEAN, bound_indicators};
use crate::error::{PipelineError, Result};
use crate::indicator::{IndicatorArrays, IndicatorDescription};
use crate::processor::{Processor, ProcessorFactory, VariableProcessor};

/// Per-pixel mean of all supplied variables.
#[derive(Debug, Default, Clone, Copy)]
pub struct VariableMeanFactory;

impl ProcessorFactory for VariableMeanFactory {
    fn name(&self) -> &str {
        VARIABLE_MEAN
    }

    fn description(&self) -> &str {
        "Averages the variables available for each date"
    }

    fn indicator_descriptions(&self) -> Vec<IndicatorDescription> {
        vec![IndicatorDescription::new(
            VARIABLE_MEAN,
            "Mean of the finite variable values per pixel",
        )]
    }

    fn create_processor(&self, indicator_names: &[String]) -> Processor {
        Processor::Variable(Box::new(VariableMean {
            indicators: bound_indicators(indicator_names, VARIABLE_MEAN),
        }))
    }
}

struct VariableMean {
    indicators: Vec<String>,
}

impl VariableProcessor for VariableMean {
    fn name(&self) -> &str {
        VARIABLE_MEAN
    }

    fn process_variables(
        &self,
        variables: &BTreeMap<String, Array2<f32>>,
    ) -> Result<IndicatorArrays> {
        let mut results = IndicatorArrays::new();
        let Some(first) = variables.values().next() else {
            return Ok(results);
        };

        let shape = first.dim();
        let mut sum = Array2::<f32>::zeros(shape);
        let mut count = Array2::<f32>::zeros(shape);
        for (name, data) in variables {
            if data.dim() != shape {
                return Err(PipelineError::Processor {
                    processor: VARIABLE_MEAN.to_string(),
                    reason: format!("variable {} has shape {:?}, expected {:?}", name, data.dim(), shape),
                });
            }
            sum.zip_mut_with(data, |s, v| {
                if v.is_finite() {
                    *s += v;
                }
            });
            count.zip_mut_with(data, |c, v| {
                if v.is_finite() {
                    *c += 1.0;
                }
            });
        }

        let mut mean = sum;
        mean.zip_mut_with(&count, |m, &c| {
            *m = if c > 0.0 { *m / c } else { f32::NAN };
        });

        for indicator in &self.indicators {
            results.insert(indicator.clone(), mean.clone());
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn processor(indicators: &[String]) -> Box<dyn VariableProcessor> {
        match VariableMeanFactory.create_processor(indicators) {
            Processor::Variable(processor) => processor,
            Processor::Observation(_) => panic!("expected a variable processor"),
        }
    }

    #[test]
    fn test_mean_ignores_non_finite_values() {
        let variables = BTreeMap::from([
            ("lai".to_string(), array![[1.0, f32::NAN], [3.0, f32::NAN]]),
            ("cab".to_string(), array![[3.0, 4.0], [f32::NAN, f32::NAN]]),
        ]);
        let results = processor(&[]).process_variables(&variables).unwrap();
        let mean = &results[VARIABLE_MEAN];

        assert_eq!(mean[[0, 0]], 2.0);
        assert_eq!(mean[[0, 1]], 4.0);
        assert_eq!(mean[[1, 0]], 3.0);
        assert!(mean[[1, 1]].is_nan());
    }

    #[test]
    fn test_no_variables_no_indicators() {
        let results = processor(&[]).process_variables(&BTreeMap::new()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_unrequested_indicator_is_not_materialized() {
        let variables = BTreeMap::from([("lai".to_string(), array![[1.0]])]);
        let results = processor(&["other".to_string()])
            .process_variables(&variables)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_shape_mismatch() {
        let variables = BTreeMap::from([
            ("lai".to_string(), array![[1.0]]),
            ("cab".to_string(), array![[1.0, 2.0]]),
        ]);
        assert!(processor(&[]).process_variables(&variables).is_err());
    }
}
