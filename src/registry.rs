use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::indicator::IndicatorDescription;
use crate::plugins;
use crate::processor::{Processor, ProcessorFactory};

/// The processor factories known to a host process.
///
/// Built once before any run and then only read. Registration does not
/// de-duplicate: registering two factories with the same name is a caller
/// error, and name lookups return the first one.
#[derive(Default)]
pub struct Registry {
    factories: Vec<Box<dyn ProcessorFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the plugins shipped with this crate.
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        plugins::register_builtin(&mut registry);
        registry
    }

    pub fn register(&mut self, factory: Box<dyn ProcessorFactory>) {
        debug!("Registering post processor {}", factory.name());
        self.factories.push(factory);
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Creates one processor per factory that declares any requested
    /// indicator, bound to the requested indicators it declares.
    pub fn resolve_by_indicators(&self, requested_names: &[String]) -> Vec<Processor> {
        self.factories
            .iter()
            .filter_map(|factory| {
                let indicator_names: Vec<String> = factory
                    .indicator_descriptions()
                    .into_iter()
                    .map(|description| description.short_name)
                    .filter(|name| requested_names.contains(name))
                    .collect();
                if indicator_names.is_empty() {
                    None
                } else {
                    Some(factory.create_processor(&indicator_names))
                }
            })
            .collect()
    }

    pub fn resolve_by_name(&self, name: &str, indicator_names: &[String]) -> Result<Processor> {
        Ok(self.factory(name)?.create_processor(indicator_names))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|factory| factory.name()).collect()
    }

    pub fn describe(&self, name: &str) -> Result<&str> {
        Ok(self.factory(name)?.description())
    }

    /// All indicators any factory can derive, without duplicates.
    pub fn available_indicators(&self) -> Vec<IndicatorDescription> {
        let mut indicators: Vec<IndicatorDescription> = Vec::new();
        for factory in &self.factories {
            for description in factory.indicator_descriptions() {
                if !indicators.contains(&description) {
                    indicators.push(description);
                }
            }
        }
        indicators
    }

    fn factory(&self, name: &str) -> Result<&dyn ProcessorFactory> {
        self.factories
            .iter()
            .find(|factory| factory.name() == name)
            .map(|factory| factory.as_ref())
            .ok_or_else(|| PipelineError::NotFound {
                name: name.to_string(),
            })
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("factories", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::IndicatorArrays;
    use crate::processor::VariableProcessor;
    use ndarray::Array2;
    use std::collections::BTreeMap;

    struct Bound {
        name: String,
        indicators: Vec<String>,
    }

    impl VariableProcessor for Bound {
        fn name(&self) -> &str {
            &self.name
        }

        fn process_variables(
            &self,
            _variables: &BTreeMap<String, Array2<f32>>,
        ) -> Result<IndicatorArrays> {
            Ok(self
                .indicators
                .iter()
                .map(|name| (name.clone(), Array2::zeros((1, 1))))
                .collect())
        }
    }

    struct Factory {
        name: &'static str,
        indicators: Vec<IndicatorDescription>,
    }

    impl ProcessorFactory for Factory {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test factory"
        }

        fn indicator_descriptions(&self) -> Vec<IndicatorDescription> {
            self.indicators.clone()
        }

        fn create_processor(&self, indicator_names: &[String]) -> Processor {
            Processor::Variable(Box::new(Bound {
                name: self.name.to_string(),
                indicators: indicator_names.to_vec(),
            }))
        }
    }

    fn nbr() -> IndicatorDescription {
        IndicatorDescription::new("NBR", "Normalized Burn Ratio")
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(Box::new(Factory {
            name: "burn",
            indicators: vec![nbr(), IndicatorDescription::new("dNBR", "Delta NBR")],
        }));
        registry.register(Box::new(Factory {
            name: "moisture",
            indicators: vec![IndicatorDescription::new("SMA", "Soil moisture anomaly")],
        }));
        registry.register(Box::new(Factory {
            name: "burn_again",
            indicators: vec![nbr()],
        }));
        registry
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_resolve_by_indicators_intersects_in_registration_order() {
        let processors = registry().resolve_by_indicators(&names(&["NBR", "SMA", "unknown"]));
        let resolved: Vec<&str> = processors.iter().map(|p| p.name()).collect();
        assert_eq!(resolved, vec!["burn", "moisture", "burn_again"]);
    }

    #[test]
    fn test_resolved_processor_is_bound_to_intersection() {
        let processors = registry().resolve_by_indicators(&names(&["dNBR"]));
        assert_eq!(processors.len(), 1);
        let Processor::Variable(processor) = &processors[0] else {
            panic!("expected a variable processor");
        };
        let result = processor.process_variables(&BTreeMap::new()).unwrap();
        assert_eq!(result.keys().collect::<Vec<_>>(), vec!["dNBR"]);
    }

    #[test]
    fn test_no_intersection_resolves_nothing() {
        assert!(registry().resolve_by_indicators(&names(&["LAI"])).is_empty());
        assert!(Registry::new().resolve_by_indicators(&names(&["NBR"])).is_empty());
    }

    #[test]
    fn test_resolve_by_name() {
        let registry = registry();
        let processor = registry.resolve_by_name("moisture", &names(&["SMA"])).unwrap();
        assert_eq!(processor.name(), "moisture");

        assert!(matches!(
            registry.resolve_by_name("missing", &[]),
            Err(PipelineError::NotFound { name }) if name == "missing"
        ));
    }

    #[test]
    fn test_available_indicators_deduplicate_by_value() {
        let indicators = registry().available_indicators();
        assert_eq!(indicators.len(), 3);
        assert_eq!(indicators.iter().filter(|d| d.short_name == "NBR").count(), 1);
    }

    #[test]
    fn test_same_name_different_description_is_kept() {
        let mut registry = Registry::new();
        registry.register(Box::new(Factory {
            name: "a",
            indicators: vec![nbr()],
        }));
        registry.register(Box::new(Factory {
            name: "b",
            indicators: vec![IndicatorDescription::new("NBR", "another definition")],
        }));
        assert_eq!(registry.available_indicators().len(), 2);
    }

    #[test]
    fn test_names_and_descriptions() {
        let registry = registry();
        assert_eq!(registry.names(), vec!["burn", "moisture", "burn_again"]);
        assert_eq!(registry.describe("burn").unwrap(), "test factory");
        assert!(registry.describe("nope").is_err());
        assert_eq!(registry.len(), 3);
    }
}
